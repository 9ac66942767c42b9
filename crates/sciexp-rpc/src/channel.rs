use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RpcError;
use crate::model::{ExperimentModel, Project};
use crate::status::{ExperimentStatus, JobStatuses};

/// Opaque authorization token forwarded on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzToken {
    pub access_token: String,
    #[serde(default)]
    pub claims_map: BTreeMap<String, String>,
}

impl AuthzToken {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Typed remote procedures exposed by the experiment service.
///
/// Calls block until the service answers or the transport gives up.
/// `close` releases the underlying connection; it must be safe to call more
/// than once, and calls made after it fail with [`RpcError::Closed`].
pub trait RpcChannel {
    fn get_user_projects(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        user_name: &str,
    ) -> Result<Vec<Project>, RpcError>;

    fn create_project(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        project: &Project,
    ) -> Result<String, RpcError>;

    fn create_experiment(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        model: &ExperimentModel,
    ) -> Result<String, RpcError>;

    fn launch_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
        gateway_id: &str,
    ) -> Result<(), RpcError>;

    fn get_experiment_status(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<ExperimentStatus, RpcError>;

    fn get_job_statuses(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<JobStatuses, RpcError>;

    fn get_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<ExperimentModel, RpcError>;

    fn terminate_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
        gateway_id: &str,
    ) -> Result<(), RpcError>;

    fn close(&mut self);
}
