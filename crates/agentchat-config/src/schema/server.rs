//! Backend endpoint and transport timing.

use serde::{Deserialize, Serialize};

/// Where the agent-execution backend lives and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// WebSocket URL of the chat endpoint (`ws://` or `wss://`).
    pub url: String,
    /// Query parameter carrying the credential during the handshake.
    pub token_param: String,
    /// Handshake timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
    /// How long `disconnect` waits for the socket to close, in ms (10-30000).
    pub close_timeout_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws/chat".into(),
            token_param: "token".into(),
            connect_timeout_secs: 15,
            close_timeout_ms: 2000,
        }
    }
}

/// Keep-alive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Seconds between outgoing pings (1-300).
    pub interval_secs: u32,
    /// Seconds of inbound silence before the link is considered dead (2-900).
    pub timeout_secs: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 25,
            timeout_secs: 60,
        }
    }
}

/// Automatic reconnect after an unexpected transport loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    /// First retry delay in ms (10-60000); doubles on each attempt.
    pub base_delay_ms: u32,
    /// Upper bound for the retry delay in ms.
    pub max_delay_ms: u32,
    /// Give up after this many attempts; 0 retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            max_attempts: 5,
        }
    }
}
