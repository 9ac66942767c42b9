use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Experiment-level lifecycle state as reported by the service.
///
/// Carried on the wire as its numeric code. Codes the client does not know,
/// and a missing or null code, decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "i32")]
pub enum ExperimentState {
    Created,
    Validated,
    Scheduled,
    Launched,
    Executing,
    Canceling,
    Canceled,
    Completed,
    Failed,
    #[default]
    Unknown,
}

impl ExperimentState {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperimentState::Created => "CREATED",
            ExperimentState::Validated => "VALIDATED",
            ExperimentState::Scheduled => "SCHEDULED",
            ExperimentState::Launched => "LAUNCHED",
            ExperimentState::Executing => "EXECUTING",
            ExperimentState::Canceling => "CANCELING",
            ExperimentState::Canceled => "CANCELED",
            ExperimentState::Completed => "COMPLETED",
            ExperimentState::Failed => "FAILED",
            ExperimentState::Unknown => "UNKNOWN",
        }
    }
}

impl From<i32> for ExperimentState {
    fn from(code: i32) -> Self {
        match code {
            0 => ExperimentState::Created,
            1 => ExperimentState::Validated,
            2 => ExperimentState::Scheduled,
            3 => ExperimentState::Launched,
            4 => ExperimentState::Executing,
            5 => ExperimentState::Canceling,
            6 => ExperimentState::Canceled,
            7 => ExperimentState::Completed,
            8 => ExperimentState::Failed,
            _ => ExperimentState::Unknown,
        }
    }
}

impl From<Option<i32>> for ExperimentState {
    fn from(code: Option<i32>) -> Self {
        code.map_or(ExperimentState::Unknown, |code| code.into())
    }
}

impl From<ExperimentState> for i32 {
    fn from(state: ExperimentState) -> Self {
        match state {
            ExperimentState::Created => 0,
            ExperimentState::Validated => 1,
            ExperimentState::Scheduled => 2,
            ExperimentState::Launched => 3,
            ExperimentState::Executing => 4,
            ExperimentState::Canceling => 5,
            ExperimentState::Canceled => 6,
            ExperimentState::Completed => 7,
            ExperimentState::Failed => 8,
            ExperimentState::Unknown => -1,
        }
    }
}

/// Batch-scheduler-level state of a single job backing an experiment.
/// A missing or null code decodes as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "i32")]
pub enum JobState {
    Submitted,
    Queued,
    Active,
    Complete,
    Canceled,
    Failed,
    Suspended,
    #[default]
    Unknown,
    NonCriticalFail,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Submitted => "SUBMITTED",
            JobState::Queued => "QUEUED",
            JobState::Active => "ACTIVE",
            JobState::Complete => "COMPLETE",
            JobState::Canceled => "CANCELED",
            JobState::Failed => "FAILED",
            JobState::Suspended => "SUSPENDED",
            JobState::Unknown => "UNKNOWN",
            JobState::NonCriticalFail => "NON_CRITICAL_FAIL",
        }
    }
}

impl From<i32> for JobState {
    fn from(code: i32) -> Self {
        match code {
            0 => JobState::Submitted,
            1 => JobState::Queued,
            2 => JobState::Active,
            3 => JobState::Complete,
            4 => JobState::Canceled,
            5 => JobState::Failed,
            6 => JobState::Suspended,
            8 => JobState::NonCriticalFail,
            _ => JobState::Unknown,
        }
    }
}

impl From<Option<i32>> for JobState {
    fn from(code: Option<i32>) -> Self {
        code.map_or(JobState::Unknown, |code| code.into())
    }
}

impl From<JobState> for i32 {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Submitted => 0,
            JobState::Queued => 1,
            JobState::Active => 2,
            JobState::Complete => 3,
            JobState::Canceled => 4,
            JobState::Failed => 5,
            JobState::Suspended => 6,
            JobState::Unknown => 7,
            JobState::NonCriticalFail => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentStatus {
    #[serde(default)]
    pub state: ExperimentState,
    #[serde(default)]
    pub time_of_state_change: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ExperimentStatus {
    pub fn new(state: ExperimentState) -> Self {
        Self {
            state,
            time_of_state_change: None,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub job_state: JobState,
    #[serde(default)]
    pub time_of_state_change: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatus {
    pub fn new(job_state: JobState) -> Self {
        Self {
            job_state,
            time_of_state_change: None,
            reason: None,
        }
    }
}

/// Job statuses keyed by job name. Iteration is in ascending key order.
pub type JobStatuses = BTreeMap<String, JobStatus>;
