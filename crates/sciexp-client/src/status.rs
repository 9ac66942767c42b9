use sciexp_rpc::{ExperimentState, JobState, RpcChannel};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::context::ConnectionContext;
use crate::error::GatewayError;
use crate::request::require_experiment_id;

/// Single state reported to callers after combining experiment and job signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconciledStatus {
    Created,
    Validated,
    Scheduled,
    Launched,
    Executing,
    Queued,
    Active,
    Canceling,
    Canceled,
    Completed,
    Failed,
    Unknown,
}

impl ReconciledStatus {
    pub const ALL: [ReconciledStatus; 12] = [
        ReconciledStatus::Created,
        ReconciledStatus::Validated,
        ReconciledStatus::Scheduled,
        ReconciledStatus::Launched,
        ReconciledStatus::Executing,
        ReconciledStatus::Queued,
        ReconciledStatus::Active,
        ReconciledStatus::Canceling,
        ReconciledStatus::Canceled,
        ReconciledStatus::Completed,
        ReconciledStatus::Failed,
        ReconciledStatus::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReconciledStatus::Created => "CREATED",
            ReconciledStatus::Validated => "VALIDATED",
            ReconciledStatus::Scheduled => "SCHEDULED",
            ReconciledStatus::Launched => "LAUNCHED",
            ReconciledStatus::Executing => "EXECUTING",
            ReconciledStatus::Queued => "QUEUED",
            ReconciledStatus::Active => "ACTIVE",
            ReconciledStatus::Canceling => "CANCELING",
            ReconciledStatus::Canceled => "CANCELED",
            ReconciledStatus::Completed => "COMPLETED",
            ReconciledStatus::Failed => "FAILED",
            ReconciledStatus::Unknown => "UNKNOWN",
        }
    }

    /// No further transitions are expected.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReconciledStatus::Completed | ReconciledStatus::Failed | ReconciledStatus::Canceled
        )
    }
}

impl fmt::Display for ReconciledStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconciledStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(ReconciledStatus::Unknown);
        }
        ReconciledStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

impl From<ExperimentState> for ReconciledStatus {
    fn from(state: ExperimentState) -> Self {
        match state {
            ExperimentState::Created => ReconciledStatus::Created,
            ExperimentState::Validated => ReconciledStatus::Validated,
            ExperimentState::Scheduled => ReconciledStatus::Scheduled,
            ExperimentState::Launched => ReconciledStatus::Launched,
            ExperimentState::Executing => ReconciledStatus::Executing,
            ExperimentState::Canceling => ReconciledStatus::Canceling,
            ExperimentState::Canceled => ReconciledStatus::Canceled,
            ExperimentState::Completed => ReconciledStatus::Completed,
            ExperimentState::Failed => ReconciledStatus::Failed,
            ExperimentState::Unknown => ReconciledStatus::Unknown,
        }
    }
}

/// Experiment states whose meaning depends on the job underneath.
pub fn needs_job_refinement(state: ExperimentState) -> bool {
    matches!(state, ExperimentState::Executing | ExperimentState::Completed)
}

/// Combines the experiment-level state with the first job's state.
///
/// `EXECUTING` is refined to `QUEUED`/`ACTIVE`, and `COMPLETED` to the job's
/// own `COMPLETED`/`FAILED`. Everything else passes through unchanged.
pub fn reconcile(experiment: ExperimentState, job: Option<JobState>) -> ReconciledStatus {
    match (experiment, job) {
        (ExperimentState::Executing, Some(JobState::Queued)) => ReconciledStatus::Queued,
        (ExperimentState::Executing, Some(JobState::Active)) => ReconciledStatus::Active,
        (ExperimentState::Completed, Some(JobState::Complete)) => ReconciledStatus::Completed,
        (ExperimentState::Completed, Some(JobState::Failed)) => ReconciledStatus::Failed,
        (state, _) => state.into(),
    }
}

/// Queries the service and returns the reconciled state of one experiment.
///
/// The job collection is only consulted for states that need refinement, and
/// only its first entry counts. A failing job query is an error, never a
/// silent fallback to the coarse state.
pub fn resolve_status<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    experiment_id: &str,
) -> Result<ReconciledStatus, GatewayError> {
    require_experiment_id(experiment_id)?;
    let status = ctx
        .channel()
        .get_experiment_status(ctx.token(), experiment_id)
        .map_err(|source| GatewayError::StatusQueryFailed {
            experiment_id: experiment_id.to_string(),
            source,
        })?;

    let job_state = if needs_job_refinement(status.state) {
        let jobs = ctx
            .channel()
            .get_job_statuses(ctx.token(), experiment_id)
            .map_err(|source| GatewayError::JobStatusQueryFailed {
                experiment_id: experiment_id.to_string(),
                source,
            })?;
        jobs.values().next().map(|job| job.job_state)
    } else {
        None
    };

    let reconciled = reconcile(status.state, job_state);
    debug!(
        experiment_id,
        experiment_state = status.state.as_str(),
        job_state = job_state.map(JobState::as_str).unwrap_or("-"),
        reconciled = reconciled.as_str(),
        "status reconciled"
    );
    Ok(reconciled)
}
