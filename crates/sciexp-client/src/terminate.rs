use sciexp_rpc::RpcChannel;
use tracing::{info, warn};

use crate::context::ConnectionContext;
use crate::error::GatewayError;
use crate::request::require_experiment_id;

pub const TERMINATION_CONFIRMATION: &str = "Experiment Terminated as Expected. No errors";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationOutcome {
    pub terminated: bool,
    pub message: String,
    pub error_code: Option<&'static str>,
}

pub fn terminate_experiment<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    experiment_id: &str,
) -> Result<(), GatewayError> {
    require_experiment_id(experiment_id)?;
    ctx.channel()
        .terminate_experiment(ctx.token(), experiment_id, ctx.gateway_id())
        .map_err(|source| GatewayError::TerminationFailed {
            experiment_id: experiment_id.to_string(),
            source,
        })?;
    info!(experiment_id, "experiment termination requested");
    Ok(())
}

pub fn terminate<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    experiment_id: &str,
) -> TerminationOutcome {
    match terminate_experiment(ctx, experiment_id) {
        Ok(()) => TerminationOutcome {
            terminated: true,
            message: TERMINATION_CONFIRMATION.to_string(),
            error_code: None,
        },
        Err(err) => {
            warn!(experiment_id, error = %err, "termination failed");
            TerminationOutcome {
                terminated: false,
                message: err.to_string(),
                error_code: Some(err.code()),
            }
        }
    }
}
