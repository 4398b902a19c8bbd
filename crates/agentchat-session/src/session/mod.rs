//! Session façade: connection lifecycle, request dispatch and routing of
//! inbound frames to the stream assembler.

mod callbacks;
mod client;
mod config;
mod credentials;
mod shared;


pub use callbacks::{
    ErrorCallback, FinalCallback, PartialCallback, SessionCallbacks, ThreadCallback,
};
pub use client::ChatSession;
pub use config::{ReconnectPolicy, SessionConfig};
pub use credentials::{CredentialProvider, StaticCredential};
