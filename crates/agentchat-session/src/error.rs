use std::time::Duration;

use crate::state::ConnectionState;

/// Failures of the underlying channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("not connected")]
    NotConnected,

    #[error("no traffic from server for {0:?}")]
    HeartbeatTimeout(Duration),

    #[error("connection closed by server: {0}")]
    ClosedByServer(String),

    #[error("websocket error: {0}")]
    Io(String),
}

impl TransportError {
    /// Whether retrying with the same credential could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::AuthRejected(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("not connected")]
    NotConnected,

    #[error("no credential available")]
    MissingCredential,

    #[error("session has been revoked")]
    Revoked,

    /// An `error` frame from the backend; displays the message verbatim.
    #[error("{0}")]
    Server(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}
