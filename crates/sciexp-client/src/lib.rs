//! Client-side facade over the remote experiment service: launch, status,
//! recorded errors and termination of experiments.

mod builder;
mod config;
mod context;
mod error;
mod failures;
mod launch;
mod project;
mod request;
mod status;
mod terminate;

pub use builder::{
    build_experiment_model, requires_user_dn, INPUT_TAR_FILE, OUTPUT_DATA, PARALLEL_GROUP_INPUT,
    WALLTIME_INPUT,
};
pub use config::{ClientConfig, ConfigError, DEFAULT_TIMEOUT_MS};
pub use context::{ConnectionContext, GatewayContext};
pub use error::GatewayError;
pub use failures::first_error;
pub use launch::{launch, launch_experiment, LaunchOutcome, LAUNCH_CONFIRMATION};
pub use project::{resolve_project, DEFAULT_PROJECT_NAME};
pub use request::LaunchRequest;
pub use status::{needs_job_refinement, reconcile, resolve_status, ReconciledStatus};
pub use terminate::{terminate, terminate_experiment, TerminationOutcome, TERMINATION_CONFIRMATION};

pub use sciexp_rpc::{AuthzToken, HttpChannel, RpcChannel, RpcError};

/// The four caller-facing operations over one long-lived connection.
pub struct GatewayClient<C: RpcChannel> {
    ctx: ConnectionContext<C>,
}

impl<C: RpcChannel> GatewayClient<C> {
    pub fn new(ctx: ConnectionContext<C>) -> Self {
        Self { ctx }
    }

    /// Wraps `channel` with an empty authorization token.
    pub fn with_channel(channel: C, gateway: GatewayContext) -> Self {
        Self::new(ConnectionContext::new(
            channel,
            AuthzToken::anonymous(),
            gateway,
        ))
    }

    pub fn context(&self) -> &ConnectionContext<C> {
        &self.ctx
    }

    pub fn launch(&self, request: &LaunchRequest) -> LaunchOutcome {
        launch(&self.ctx, request)
    }

    pub fn get_status(&self, experiment_id: &str) -> Result<ReconciledStatus, GatewayError> {
        resolve_status(&self.ctx, experiment_id)
    }

    pub fn get_errors(&self, experiment_id: &str) -> Result<Option<String>, GatewayError> {
        first_error(&self.ctx, experiment_id)
    }

    pub fn terminate(&self, experiment_id: &str) -> TerminationOutcome {
        terminate(&self.ctx, experiment_id)
    }

    /// Closes the channel now instead of at drop.
    pub fn shutdown(mut self) {
        self.ctx.close();
    }
}

impl GatewayClient<HttpChannel> {
    pub fn connect(config: &ClientConfig) -> Result<Self, GatewayError> {
        let channel = HttpChannel::connect(&config.server_host, config.server_port, config.timeout())
            .map_err(GatewayError::Connect)?;
        Ok(Self::with_channel(channel, config.gateway_context()))
    }
}
