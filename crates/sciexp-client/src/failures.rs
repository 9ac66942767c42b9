use sciexp_rpc::RpcChannel;
use tracing::debug;

use crate::context::ConnectionContext;
use crate::error::GatewayError;
use crate::request::require_experiment_id;

/// Message of the first error recorded on the experiment, if any.
///
/// Prefers the raw error text and falls back to the user-friendly message
/// when the record carries only that.
pub fn first_error<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    experiment_id: &str,
) -> Result<Option<String>, GatewayError> {
    require_experiment_id(experiment_id)?;
    let model = ctx
        .channel()
        .get_experiment(ctx.token(), experiment_id)
        .map_err(|source| GatewayError::FetchFailed {
            experiment_id: experiment_id.to_string(),
            source,
        })?;
    let recorded = model.errors.unwrap_or_default();
    debug!(experiment_id, recorded = recorded.len(), "experiment errors fetched");
    Ok(recorded
        .into_iter()
        .next()
        .and_then(|error| error.actual_error_message.or(error.user_friendly_message)))
}
