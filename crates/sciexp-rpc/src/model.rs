use serde::{Deserialize, Serialize};

use crate::status::ExperimentStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentType {
    #[default]
    SingleApplication,
    Workflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    String,
    Integer,
    Float,
    Uri,
    UriCollection,
    Stdout,
    Stderr,
}

/// Scheduling block: where and how large the job is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationalResourceScheduling {
    pub resource_host_id: String,
    pub queue_name: String,
    pub node_count: u32,
    pub total_cpu_count: u32,
    /// Minutes.
    pub wall_time_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfigurationData {
    pub airavata_auto_schedule: bool,
    pub override_manual_scheduled_params: bool,
    #[serde(default)]
    pub share_experiment_publicly: bool,
    pub computational_resource_scheduling: ComputationalResourceScheduling,
    #[serde(default)]
    pub experiment_data_dir: Option<String>,
    #[serde(default)]
    pub user_dn: Option<String>,
    #[serde(default)]
    pub generate_cert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDataObject {
    pub name: String,
    pub value: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub input_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDataObject {
    pub name: String,
    pub value: String,
    pub data_type: DataType,
    #[serde(default)]
    pub data_movement: bool,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    #[serde(default)]
    pub error_id: Option<String>,
    #[serde(default)]
    pub creation_time: Option<i64>,
    #[serde(default)]
    pub actual_error_message: Option<String>,
    #[serde(default)]
    pub user_friendly_message: Option<String>,
    #[serde(default)]
    pub transient_or_persistent: bool,
}

/// Experiment entity as accepted by `createExperiment` and returned by
/// `getExperiment`. The service owns it once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentModel {
    #[serde(default)]
    pub experiment_id: Option<String>,
    pub project_id: String,
    pub gateway_id: String,
    #[serde(default)]
    pub experiment_type: ExperimentType,
    pub user_name: String,
    pub experiment_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub gateway_execution_id: Option<String>,
    pub user_configuration_data: UserConfigurationData,
    #[serde(default)]
    pub experiment_inputs: Vec<InputDataObject>,
    #[serde(default)]
    pub experiment_outputs: Vec<OutputDataObject>,
    #[serde(default)]
    pub experiment_status: Option<ExperimentStatus>,
    #[serde(default)]
    pub errors: Option<Vec<ErrorModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub project_id: Option<String>,
    pub owner: String,
    pub gateway_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
