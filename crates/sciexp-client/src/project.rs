use sciexp_rpc::{Project, RpcChannel, RpcError};
use tracing::{debug, info};

use crate::context::ConnectionContext;
use crate::error::GatewayError;

pub const DEFAULT_PROJECT_NAME: &str = "Default_Project";

/// Returns the project new experiments of `user_id` belong to.
///
/// Uses the first project the service lists for the user; when there is none,
/// creates `Default_Project` for them.
pub fn resolve_project<C: RpcChannel>(
    ctx: &ConnectionContext<C>,
    user_id: &str,
) -> Result<String, GatewayError> {
    if user_id.trim().is_empty() {
        return Err(GatewayError::LocalValidation(
            "user_id must not be empty".to_string(),
        ));
    }
    let lookup_failed = |source: RpcError| GatewayError::LookupFailed {
        user: user_id.to_string(),
        source,
    };

    let projects = ctx
        .channel()
        .get_user_projects(ctx.token(), ctx.gateway_id(), user_id)
        .map_err(lookup_failed)?;
    if let Some(project_id) = projects.into_iter().find_map(|p| p.project_id) {
        debug!(user = user_id, project_id = %project_id, "project resolved");
        return Ok(project_id);
    }

    let project = Project {
        project_id: None,
        owner: user_id.to_string(),
        gateway_id: ctx.gateway_id().to_string(),
        name: DEFAULT_PROJECT_NAME.to_string(),
        description: None,
    };
    let project_id = ctx
        .channel()
        .create_project(ctx.token(), ctx.gateway_id(), &project)
        .map_err(lookup_failed)?;
    info!(user = user_id, project_id = %project_id, "created default project");
    Ok(project_id)
}
