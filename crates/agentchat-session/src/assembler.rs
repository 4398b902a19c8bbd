//! Incremental assembly of one streamed response.
//!
//! The assembler is a plain state machine over inbound frames: each call to
//! [`StreamAssembler::apply`] consumes one frame and returns at most one
//! outcome for the consumer. It never reorders or deduplicates; the transport
//! delivers frames in order.

use std::time::Instant;

use tracing::{debug, warn};

use crate::protocol::{DoneMetadata, InboundFrame};
use crate::types::{ChatResult, PartialResult, ResultMetadata, Role, ThreadCreated};

/// What a consumer should be told after one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Partial(PartialResult),
    Final(ChatResult),
    ThreadCreated(ThreadCreated),
    Error(String),
}

/// Text of the in-flight response.
#[derive(Debug)]
struct Accumulator {
    text: String,
    /// `None` when tokens arrived without a preceding `thinking`.
    started_at: Option<Instant>,
}

impl Accumulator {
    fn elapsed_ms(&self, now: Instant) -> u64 {
        self.started_at
            .map(|start| now.saturating_duration_since(start).as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Holds at most one accumulator at a time.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    active: Option<Accumulator>,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a response is currently streaming.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Text accumulated so far, if a response is streaming.
    pub fn current_text(&self) -> Option<&str> {
        self.active.as_ref().map(|acc| acc.text.as_str())
    }

    /// Drop the in-flight response without reporting it.
    pub fn discard(&mut self) {
        if let Some(acc) = self.active.take() {
            debug!(chars = acc.text.len(), "Discarded in-flight response");
        }
    }

    /// Consume one inbound frame.
    pub fn apply(&mut self, frame: InboundFrame, now: Instant) -> Option<StreamOutcome> {
        match frame {
            InboundFrame::Connected | InboundFrame::Pong | InboundFrame::Unknown => None,
            InboundFrame::Thinking => {
                if let Some(prev) = self.active.take() {
                    warn!(
                        chars = prev.text.len(),
                        "Response restarted before completion; abandoning previous text"
                    );
                }
                self.active = Some(Accumulator {
                    text: String::new(),
                    started_at: Some(now),
                });
                Some(StreamOutcome::Partial(PartialResult {
                    content: String::new(),
                    elapsed_ms: 0,
                }))
            }
            InboundFrame::ThreadCreated { thread_id, title } => {
                Some(StreamOutcome::ThreadCreated(ThreadCreated { thread_id, title }))
            }
            InboundFrame::Token { content } => {
                let acc = self.active.get_or_insert_with(|| {
                    debug!("Token arrived before thinking; starting response without a start time");
                    Accumulator {
                        text: String::new(),
                        started_at: None,
                    }
                });
                acc.text.push_str(&content);
                Some(StreamOutcome::Partial(PartialResult {
                    content: acc.text.clone(),
                    elapsed_ms: acc.elapsed_ms(now),
                }))
            }
            InboundFrame::Done(meta) => {
                let acc = self.active.take();
                if acc.is_none() {
                    debug!("Done arrived with no response in flight");
                }
                let (content, duration_ms) = match acc {
                    Some(acc) => {
                        let elapsed = acc.elapsed_ms(now);
                        (acc.text, elapsed)
                    }
                    None => (String::new(), 0),
                };
                Some(StreamOutcome::Final(finalize(content, duration_ms, meta)))
            }
            InboundFrame::Error { error } => {
                self.discard();
                Some(StreamOutcome::Error(
                    error.unwrap_or_else(|| "unknown error".to_string()),
                ))
            }
        }
    }
}

fn finalize(content: String, duration_ms: u64, meta: DoneMetadata) -> ChatResult {
    ChatResult {
        role: Role::Assistant,
        content,
        timestamp: meta
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        message_id: meta.message_id.unwrap_or_else(agentchat_common::new_id),
        metadata: ResultMetadata {
            total_tokens: meta.token_usage.and_then(|usage| usage.total),
            duration_ms,
            agent_name: meta.agent_name,
            agent_id: meta.agent_id,
            thread_id: meta.thread_id,
            thread_renamed: meta.thread_renamed.unwrap_or(false),
            new_thread_title: meta.new_thread_title,
        },
    }
}
