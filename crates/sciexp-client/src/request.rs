use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Flat description of one experiment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Host the submitting system runs on.
    pub source_host: String,
    pub user_id: String,
    pub experiment_name: String,
    /// Caller-side identifier, echoed to the service as the gateway execution id.
    pub request_id: String,
    pub resource: String,
    pub queue: String,
    pub cores: u32,
    pub nodes: u32,
    pub groups: u32,
    pub wall_time_minutes: u32,
    /// Only honoured by resources that submit under a user DN.
    #[serde(default)]
    pub cluster_user: Option<String>,
    pub input_path: String,
    pub output_dir: String,
}

impl LaunchRequest {
    /// Checks caller-side constraints; reports every problem at once.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut problems = Vec::new();
        let required = [
            ("user_id", &self.user_id),
            ("experiment_name", &self.experiment_name),
            ("request_id", &self.request_id),
            ("resource", &self.resource),
            ("queue", &self.queue),
            ("input_path", &self.input_path),
            ("output_dir", &self.output_dir),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{} must not be empty", field));
            }
        }
        let positive = [
            ("cores", self.cores),
            ("nodes", self.nodes),
            ("groups", self.groups),
            ("wall_time_minutes", self.wall_time_minutes),
        ];
        for (field, value) in positive {
            if value == 0 {
                problems.push(format!("{} must be positive", field));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::LocalValidation(problems.join("; ")))
        }
    }
}

pub(crate) fn require_experiment_id(experiment_id: &str) -> Result<(), GatewayError> {
    if experiment_id.trim().is_empty() {
        return Err(GatewayError::LocalValidation(
            "experiment_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_request() -> LaunchRequest {
    LaunchRequest {
        source_host: "uslims3.example.edu".to_string(),
        user_id: "alice".to_string(),
        experiment_name: "US3-AIRA".to_string(),
        request_id: "uslims3_CU_Boulder_1974".to_string(),
        resource: "comet.sdsc.edu".to_string(),
        queue: "normal".to_string(),
        cores: 24,
        nodes: 1,
        groups: 1,
        wall_time_minutes: 60,
        cluster_user: None,
        input_path: "in.tar".to_string(),
        output_dir: "/out".to_string(),
    }
}
