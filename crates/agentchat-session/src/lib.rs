//! Streaming chat session client.
//!
//! Opens a long-lived WebSocket to an agent-execution backend, tracks the
//! connection lifecycle and assembles streamed responses token by token:
//!
//! - [`transport`]: socket ownership, frame codec, heartbeat
//! - [`state`]: connection state machine with ordered change notifications
//! - [`assembler`]: turns `thinking`/`token`/`done`/`error` frames into
//!   partial and final results
//! - [`session`]: the [`ChatSession`] façade tying them together

pub mod assembler;
pub mod error;
pub mod protocol;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;

pub use assembler::{StreamAssembler, StreamOutcome};
pub use error::{SessionError, TransportError};
pub use protocol::{InboundFrame, OutboundFrame};
pub use session::{
    ChatSession, CredentialProvider, ReconnectPolicy, SessionCallbacks, SessionConfig,
    StaticCredential,
};
pub use state::{ConnectionState, StateObserver, Transition};
pub use transport::TransportConfig;
pub use types::{ChatRequest, ChatResult, PartialResult, ResultMetadata, Role, ThreadCreated};
