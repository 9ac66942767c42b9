use sciexp_rpc::RpcError;
use thiserror::Error;

/// Failure of one client operation, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid launch request: {0}")]
    LocalValidation(String),
    #[error("could not open channel to experiment service: {0}")]
    Connect(#[source] RpcError),
    #[error("project lookup failed for user '{user}': {source}")]
    LookupFailed {
        user: String,
        #[source]
        source: RpcError,
    },
    #[error("experiment creation failed: {0}")]
    CreateFailed(#[source] RpcError),
    #[error("experiment {experiment_id} was created but could not be launched: {source}")]
    LaunchFailed {
        experiment_id: String,
        #[source]
        source: RpcError,
    },
    #[error("status query failed for experiment {experiment_id}: {source}")]
    StatusQueryFailed {
        experiment_id: String,
        #[source]
        source: RpcError,
    },
    #[error("job status query failed for experiment {experiment_id}: {source}")]
    JobStatusQueryFailed {
        experiment_id: String,
        #[source]
        source: RpcError,
    },
    #[error("could not fetch experiment {experiment_id}: {source}")]
    FetchFailed {
        experiment_id: String,
        #[source]
        source: RpcError,
    },
    #[error("termination failed for experiment {experiment_id}: {source}")]
    TerminationFailed {
        experiment_id: String,
        #[source]
        source: RpcError,
    },
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::LocalValidation(_) => "local_validation",
            GatewayError::Connect(_) => "connect_failed",
            GatewayError::LookupFailed { .. } => "lookup_failed",
            GatewayError::CreateFailed(_) => "create_failed",
            GatewayError::LaunchFailed { .. } => "launch_failed",
            GatewayError::StatusQueryFailed { .. } => "status_query_failed",
            GatewayError::JobStatusQueryFailed { .. } => "job_status_query_failed",
            GatewayError::FetchFailed { .. } => "fetch_failed",
            GatewayError::TerminationFailed { .. } => "termination_failed",
        }
    }

    /// The remote failure underneath, if the error came from the service.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            GatewayError::LocalValidation(_) => None,
            GatewayError::Connect(source) | GatewayError::CreateFailed(source) => Some(source),
            GatewayError::LookupFailed { source, .. }
            | GatewayError::LaunchFailed { source, .. }
            | GatewayError::StatusQueryFailed { source, .. }
            | GatewayError::JobStatusQueryFailed { source, .. }
            | GatewayError::FetchFailed { source, .. }
            | GatewayError::TerminationFailed { source, .. } => Some(source),
        }
    }
}
