//! Chat wire protocol. Every frame is a JSON object sent as a UTF-8 text
//! frame, discriminated by its `type` field.

use serde::{Deserialize, Serialize};

/// Frames the client sends to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Chat {
        agent_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        thread_id: Option<i64>,
        message: String,
    },
    Ping,
}

/// Frames the backend sends to the client.
///
/// Fields not listed here are ignored; an unrecognised `type` decodes to
/// [`InboundFrame::Unknown`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Session-level handshake acknowledgment.
    Connected,
    /// A response is about to stream.
    Thinking,
    ThreadCreated {
        thread_id: i64,
        #[serde(default)]
        title: String,
    },
    Token {
        #[serde(default)]
        content: String,
    },
    Done(DoneMetadata),
    Error {
        #[serde(default)]
        error: Option<String>,
    },
    Pong,
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    /// The wire discriminator of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundFrame::Connected => "connected",
            InboundFrame::Thinking => "thinking",
            InboundFrame::ThreadCreated { .. } => "thread_created",
            InboundFrame::Token { .. } => "token",
            InboundFrame::Done(_) => "done",
            InboundFrame::Error { .. } => "error",
            InboundFrame::Pong => "pong",
            InboundFrame::Unknown => "unknown",
        }
    }
}

/// Completion metadata carried by a `done` frame. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DoneMetadata {
    pub message_id: Option<String>,
    pub timestamp: Option<String>,
    pub token_usage: Option<TokenUsage>,
    pub agent_name: Option<String>,
    pub agent_id: Option<i64>,
    pub thread_id: Option<i64>,
    pub thread_renamed: Option<bool>,
    pub new_thread_title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub total: Option<u64>,
}

/// Encode an outbound frame as JSON text.
pub fn encode(frame: &OutboundFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

/// Decode one inbound text frame.
pub fn decode(text: &str) -> Result<InboundFrame, serde_json::Error> {
    serde_json::from_str(text)
}
