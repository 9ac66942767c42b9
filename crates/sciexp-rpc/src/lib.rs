//! Remote data contracts and the channel used to reach the experiment service.

mod channel;
mod error;
mod http;
mod model;
mod status;

pub use channel::{AuthzToken, RpcChannel};
pub use error::RpcError;
pub use http::HttpChannel;
pub use model::{
    ComputationalResourceScheduling, DataType, ErrorModel, ExperimentModel, ExperimentType,
    InputDataObject, OutputDataObject, Project, UserConfigurationData,
};
pub use status::{ExperimentState, ExperimentStatus, JobState, JobStatus, JobStatuses};
