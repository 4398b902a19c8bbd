//! Terminal driver for one chat session: streams deltas to stdout and a
//! summary line per response to stderr.

use std::io::Write;

use agentchat_common::{AgentChatError, Result};
use agentchat_session::{
    ChatRequest, ChatResult, ChatSession, ConnectionState, SessionCallbacks, SessionConfig,
    SessionError, StaticCredential, ThreadCreated,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Session output forwarded from the callbacks to the driver.
enum Event {
    Partial(String),
    Final(ChatResult),
    Thread(ThreadCreated),
    Error(SessionError),
}

fn callbacks(tx: mpsc::UnboundedSender<Event>) -> SessionCallbacks {
    let partial_tx = tx.clone();
    let final_tx = tx.clone();
    let thread_tx = tx.clone();
    SessionCallbacks::new()
        .on_partial(move |p| {
            let _ = partial_tx.send(Event::Partial(p.content.clone()));
        })
        .on_final(move |r| {
            let _ = final_tx.send(Event::Final(r.clone()));
        })
        .on_thread_created(move |t| {
            let _ = thread_tx.send(Event::Thread(t.clone()));
        })
        .on_error(move |e| {
            let _ = tx.send(Event::Error(e.clone()));
        })
}

pub struct Conversation {
    session: ChatSession,
    events: mpsc::UnboundedReceiver<Event>,
    agent_id: i64,
    thread_id: Option<i64>,
}

impl Conversation {
    pub fn new(
        config: SessionConfig,
        credential: StaticCredential,
        agent_id: i64,
        thread_id: Option<i64>,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let session = ChatSession::new(config, std::sync::Arc::new(credential), callbacks(tx));
        session.on_state_change(|t| debug!(from = %t.from, to = %t.to, "Session state"));
        Self {
            session,
            events,
            agent_id,
            thread_id,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.state() == ConnectionState::Connected
    }

    /// Connect and wait for the server to acknowledge the session.
    pub async fn open(&mut self) -> Result<()> {
        let outcome = match self.session.connect().await {
            Ok(()) => self.session.wait_connected().await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                info!(session = %self.session.id().short(), agent_id = self.agent_id, "Connected");
                Ok(())
            }
            Err(e) => {
                // The callback carries the underlying cause.
                let reported = self.drain().into_iter().find_map(|event| match event {
                    Event::Error(e) => Some(e),
                    _ => None,
                });
                Err(AgentChatError::Network(reported.unwrap_or(e).to_string()))
            }
        }
    }

    /// Send one message and stream the reply until it finishes or fails.
    pub async fn ask(&mut self, message: &str) -> Result<ChatResult> {
        self.drain();

        let mut request = ChatRequest::new(self.agent_id, message);
        if let Some(thread_id) = self.thread_id {
            request = request.in_thread(thread_id);
        }
        self.session
            .send(request)
            .map_err(|e| AgentChatError::Session(e.to_string()))?;

        let mut shown = String::new();
        while let Some(event) = self.events.recv().await {
            match event {
                Event::Partial(content) => {
                    emit(delta(&shown, &content))?;
                    shown = content;
                }
                Event::Thread(thread) => {
                    info!(thread_id = thread.thread_id, title = %thread.title, "Thread created");
                    self.thread_id = Some(thread.thread_id);
                }
                Event::Final(result) => {
                    emit(&format!("{}\n", delta(&shown, &result.content)))?;
                    if let Some(thread_id) = result.metadata.thread_id {
                        self.thread_id = Some(thread_id);
                    }
                    eprintln!("{}", summary(&result));
                    return Ok(result);
                }
                Event::Error(e) => {
                    if !shown.is_empty() {
                        emit("\n")?;
                    }
                    return Err(AgentChatError::Session(e.to_string()));
                }
            }
        }
        Err(AgentChatError::Session("session closed".into()))
    }

    pub async fn close(self) {
        self.session.disconnect().await;
    }

    /// Drop output left over from earlier activity (e.g. an idle disconnect).
    fn drain(&mut self) -> Vec<Event> {
        let mut stale = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let Event::Error(e) = &event {
                debug!(error = %e, "Discarding stale session error");
            }
            stale.push(event);
        }
        stale
    }
}

fn emit(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// The part of `content` not yet printed. A restarted stream is printed whole.
fn delta<'a>(shown: &str, content: &'a str) -> &'a str {
    content.strip_prefix(shown).unwrap_or(content)
}

fn summary(result: &ChatResult) -> String {
    let meta = &result.metadata;
    let mut parts = vec![format!("message {}", result.message_id)];
    if let Some(agent) = &meta.agent_name {
        parts.push(format!("agent {agent}"));
    }
    if let Some(thread_id) = meta.thread_id {
        parts.push(format!("thread {thread_id}"));
    }
    if meta.thread_renamed {
        if let Some(title) = &meta.new_thread_title {
            parts.push(format!("renamed to \"{title}\""));
        }
    }
    if let Some(tokens) = meta.total_tokens {
        parts.push(format!("{tokens} tokens"));
    }
    parts.push(format!("{} ms", meta.duration_ms));
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_session::{ResultMetadata, Role};

    #[test]
    fn delta_prints_only_new_text() {
        assert_eq!(delta("", "Hel"), "Hel");
        assert_eq!(delta("Hel", "Hello"), "lo");
        assert_eq!(delta("Hello", "Hello"), "");
    }

    #[test]
    fn delta_after_restart_prints_everything() {
        assert_eq!(delta("Hello", "Fresh"), "Fresh");
    }

    #[test]
    fn summary_lists_known_metadata() {
        let result = ChatResult {
            role: Role::Assistant,
            content: "Hello".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            message_id: "m1".into(),
            metadata: ResultMetadata {
                total_tokens: Some(12),
                duration_ms: 340,
                agent_name: Some("Scout".into()),
                thread_id: Some(42),
                thread_renamed: true,
                new_thread_title: Some("Greetings".into()),
                ..Default::default()
            },
        };
        assert_eq!(
            summary(&result),
            "[message m1, agent Scout, thread 42, renamed to \"Greetings\", 12 tokens, 340 ms]"
        );
    }

    #[test]
    fn summary_with_bare_metadata() {
        let result = ChatResult {
            role: Role::Assistant,
            content: String::new(),
            timestamp: String::new(),
            message_id: "m2".into(),
            metadata: ResultMetadata::default(),
        };
        assert_eq!(summary(&result), "[message m2, 0 ms]");
    }
}
