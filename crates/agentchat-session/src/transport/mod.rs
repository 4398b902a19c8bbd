//! WebSocket transport for the chat backend.
//!
//! Owns the socket, encodes outbound frames, decodes inbound ones and keeps
//! the link alive with `ping` frames. Decoded frames are routed by their
//! `type` discriminator to the single [`FrameHandler`] registered when the
//! connection was started; unknown or malformed frames are logged and dropped.

mod config;
mod connection;
mod io;

pub use config::TransportConfig;
pub use connection::{Connection, Handshake};

use crate::error::TransportError;
use crate::protocol::InboundFrame;

/// Why a connection's I/O task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `close` was called or the owning handle was dropped.
    Requested,
    Lost(TransportError),
}

/// Receives every decoded frame of one connection, in arrival order, on the
/// connection's I/O task.
pub trait FrameHandler: Send + Sync + 'static {
    fn on_frame(&self, frame: InboundFrame);

    /// Called exactly once, after the socket has been released.
    fn on_closed(&self, reason: CloseReason);
}
