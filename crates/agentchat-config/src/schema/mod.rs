//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod server;
mod system;

pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentChatConfig {
    pub server: ServerConfig,
    pub heartbeat: HeartbeatConfig,
    pub reconnect: ReconnectConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}
