use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("connectivity failure: {0}")]
    Connectivity(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("remote system error: {0}")]
    RemoteSystem(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("channel is closed")]
    Closed,
}

impl RpcError {
    /// Stable tag used in machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Connectivity(_) => "connectivity",
            RpcError::InvalidRequest(_) => "invalid_request",
            RpcError::NotFound(_) => "not_found",
            RpcError::RemoteSystem(_) => "remote_system",
            RpcError::Protocol(_) => "protocol",
            RpcError::Closed => "closed",
        }
    }

    /// Maps a fault reported by the service onto the local taxonomy.
    pub fn from_remote(kind: &str, message: String) -> Self {
        match kind {
            "invalid_request" | "client" => RpcError::InvalidRequest(message),
            "not_found" => RpcError::NotFound(message),
            "system" => RpcError::RemoteSystem(message),
            other => RpcError::RemoteSystem(format!("{}: {}", other, message)),
        }
    }
}
