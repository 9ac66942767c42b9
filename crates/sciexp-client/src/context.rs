use sciexp_rpc::{AuthzToken, RpcChannel};
use tracing::debug;

/// Tenant-level identifiers that go into every experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayContext {
    pub gateway_id: String,
    pub application_interface_id: Option<String>,
}

/// Owns the channel, token and gateway for the life of the process.
///
/// The channel is closed exactly once: by [`ConnectionContext::close`] or,
/// failing that, when the context is dropped.
pub struct ConnectionContext<C: RpcChannel> {
    channel: C,
    token: AuthzToken,
    gateway: GatewayContext,
    closed: bool,
}

impl<C: RpcChannel> ConnectionContext<C> {
    pub fn new(channel: C, token: AuthzToken, gateway: GatewayContext) -> Self {
        Self {
            channel,
            token,
            gateway,
            closed: false,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn token(&self) -> &AuthzToken {
        &self.token
    }

    pub fn gateway(&self) -> &GatewayContext {
        &self.gateway
    }

    pub fn gateway_id(&self) -> &str {
        &self.gateway.gateway_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.channel.close();
        self.closed = true;
        debug!(gateway_id = %self.gateway.gateway_id, "connection context released");
    }
}

impl<C: RpcChannel> Drop for ConnectionContext<C> {
    fn drop(&mut self) {
        self.close();
    }
}
