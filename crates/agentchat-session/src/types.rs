//! Requests, results and notifications exchanged with the consumer.

use serde::{Deserialize, Serialize};

use crate::protocol::OutboundFrame;

/// One outbound chat message addressed to an agent.
///
/// Without a thread id the backend creates a new thread and announces it
/// with a `thread_created` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub agent_id: i64,
    pub message: String,
    pub thread_id: Option<i64>,
}

impl ChatRequest {
    pub fn new(agent_id: i64, message: impl Into<String>) -> Self {
        Self {
            agent_id,
            message: message.into(),
            thread_id: None,
        }
    }

    pub fn in_thread(mut self, thread_id: i64) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    pub(crate) fn to_frame(&self) -> OutboundFrame {
        OutboundFrame::Chat {
            agent_id: self.agent_id,
            thread_id: self.thread_id,
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// The response text assembled so far for the in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub content: String,
    /// Milliseconds since the response began.
    pub elapsed_ms: u64,
}

/// A finalized assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp, server-provided when available.
    pub timestamp: String,
    pub message_id: String,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub total_tokens: Option<u64>,
    /// Time from `thinking` to `done`; zero when the start was never seen.
    pub duration_ms: u64,
    pub agent_name: Option<String>,
    pub agent_id: Option<i64>,
    pub thread_id: Option<i64>,
    /// Set when the backend renamed the thread as a side effect of this exchange.
    pub thread_renamed: bool,
    pub new_thread_title: Option<String>,
}

/// The backend opened a new thread for a request sent without a thread id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadCreated {
    pub thread_id: i64,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_thread() {
        let req = ChatRequest::new(7, "hi");
        assert_eq!(req.thread_id, None);
        let req = req.in_thread(42);
        assert_eq!(req.thread_id, Some(42));
        assert_eq!(req.message, "hi");
    }

    #[test]
    fn request_maps_to_chat_frame() {
        let frame = ChatRequest::new(7, "hi").in_thread(3).to_frame();
        assert_eq!(
            frame,
            OutboundFrame::Chat {
                agent_id: 7,
                thread_id: Some(3),
                message: "hi".into(),
            }
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
