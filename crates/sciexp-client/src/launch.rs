use sciexp_rpc::RpcChannel;
use tracing::{debug, info, warn};

use crate::builder::build_experiment_model;
use crate::context::ConnectionContext;
use crate::error::GatewayError;
use crate::project::resolve_project;
use crate::request::LaunchRequest;

pub const LAUNCH_CONFIRMATION: &str = "Experiment Created and Launched as Expected. No errors";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub launched: bool,
    /// Present only when the experiment was both created and launched.
    pub experiment_id: Option<String>,
    pub message: String,
    pub error_code: Option<&'static str>,
}

/// Resolves the project, builds the model, then creates and launches it.
///
/// Steps run strictly in order and stop at the first failure. A launch
/// failure leaves the created experiment on the service; its id is carried
/// by [`GatewayError::LaunchFailed`].
pub fn launch_experiment<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    request: &LaunchRequest,
) -> Result<String, GatewayError> {
    request.validate()?;
    let project_id = resolve_project(ctx, &request.user_id)?;
    let model = build_experiment_model(request, ctx.gateway(), &project_id)?;

    let experiment_id = ctx
        .channel()
        .create_experiment(ctx.token(), ctx.gateway_id(), &model)
        .map_err(GatewayError::CreateFailed)?;
    debug!(experiment_id = %experiment_id, project_id = %project_id, "experiment created");

    if let Err(source) =
        ctx.channel()
            .launch_experiment(ctx.token(), &experiment_id, ctx.gateway_id())
    {
        warn!(experiment_id = %experiment_id, error = %source, "experiment created but not launched");
        return Err(GatewayError::LaunchFailed {
            experiment_id,
            source,
        });
    }
    info!(
        experiment_id = %experiment_id,
        user = %request.user_id,
        resource = %request.resource,
        "experiment launched"
    );
    Ok(experiment_id)
}

/// [`launch_experiment`] folded into a caller-facing outcome.
pub fn launch<C: RpcChannel>(ctx: &ConnectionContext<C>, request: &LaunchRequest) -> LaunchOutcome {
    match launch_experiment(ctx, request) {
        Ok(experiment_id) => LaunchOutcome {
            launched: true,
            experiment_id: Some(experiment_id),
            message: LAUNCH_CONFIRMATION.to_string(),
            error_code: None,
        },
        Err(err) => LaunchOutcome {
            launched: false,
            experiment_id: None,
            message: err.to_string(),
            error_code: Some(err.code()),
        },
    }
}
