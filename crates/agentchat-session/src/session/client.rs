//! Public handle for one streaming chat session.

use std::sync::Arc;

use agentchat_common::SessionId;

use super::callbacks::SessionCallbacks;
use super::config::SessionConfig;
use super::credentials::CredentialProvider;
use super::shared::Shared;
use crate::error::SessionError;
use crate::state::{ConnectionState, StateObserver, Transition};
use crate::types::ChatRequest;

/// One logical streaming conversation with the agent backend.
///
/// The session owns at most one transport connection at a time. Content
/// arrives asynchronously through the [`SessionCallbacks`]; lifecycle changes
/// through [`ChatSession::on_state_change`]. Dropping the handle tears the
/// connection down immediately.
pub struct ChatSession {
    shared: Arc<Shared>,
}

impl ChatSession {
    pub fn new(
        config: SessionConfig,
        credentials: Arc<dyn CredentialProvider>,
        callbacks: SessionCallbacks,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, credentials, callbacks)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    /// Register a state subscriber. Subscribers run synchronously, in
    /// registration order, once per transition. They may read the state but
    /// must not call `on_state_change` themselves.
    pub fn on_state_change(&self, listener: impl Fn(Transition) + Send + Sync + 'static) {
        self.shared.subscribe(Box::new(listener));
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// A cheap, cloneable view of the state for other tasks.
    pub fn observer(&self) -> StateObserver {
        self.shared.observer()
    }

    /// Whether a response is currently streaming.
    pub fn is_streaming(&self) -> bool {
        self.shared.is_streaming()
    }

    pub fn is_revoked(&self) -> bool {
        self.shared.is_revoked()
    }

    /// Open a fresh transport connection.
    ///
    /// Returns once the WebSocket handshake completes; the state becomes
    /// `connected` only when the server acknowledges the session. Does nothing
    /// when already connecting or connected.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.shared.connect().await
    }

    /// Wait for the outcome of a pending `connect`.
    pub async fn wait_connected(&self) -> Result<(), SessionError> {
        match self.shared.settled().await {
            ConnectionState::Connected => Ok(()),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Close the connection and discard any in-flight response without
    /// reporting it. The backend is not told about the abandoned request.
    pub async fn disconnect(&self) {
        self.shared.disconnect().await;
    }

    /// Disconnect for good: later `connect` calls fail with
    /// [`SessionError::Revoked`].
    pub async fn revoke(&self) {
        self.shared.revoke().await;
    }

    /// Send a chat request. Rejected with [`SessionError::NotConnected`],
    /// without transmitting anything, unless the session is connected.
    pub fn send(&self, request: ChatRequest) -> Result<(), SessionError> {
        self.shared.send(&request)
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}
