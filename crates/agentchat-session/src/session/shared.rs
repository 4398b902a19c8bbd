//! State shared between the public handle, the connection's I/O task and
//! reconnect timers.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use agentchat_common::SessionId;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::callbacks::SessionCallbacks;
use super::config::SessionConfig;
use super::credentials::CredentialProvider;
use crate::assembler::StreamAssembler;
use crate::error::{SessionError, TransportError};
use crate::protocol::InboundFrame;
use crate::state::{ConnectionState, StateMachine, StateObserver};
use crate::transport::{CloseReason, Connection, FrameHandler};
use crate::types::ChatRequest;

/// The assembler together with the generation of the connection allowed to
/// feed it. Every new or retired connection bumps the generation, so frames
/// from an older connection can never reach a newer stream.
struct StreamSlot {
    generation: u64,
    assembler: StreamAssembler,
}

impl StreamSlot {
    /// Retire the current connection and drop any in-flight response.
    fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.assembler.discard();
        self.generation
    }
}

pub(crate) struct Shared {
    pub(crate) id: SessionId,
    config: SessionConfig,
    credentials: Arc<dyn CredentialProvider>,
    callbacks: SessionCallbacks,
    machine: Mutex<StateMachine>,
    observer: StateObserver,
    state_rx: watch::Receiver<ConnectionState>,
    stream: Mutex<StreamSlot>,
    connection: Mutex<Option<Connection>>,
    revoked: AtomicBool,
    reconnect_attempts: AtomicU32,
    /// Serializes connect, disconnect and revoke.
    lifecycle: tokio::sync::Mutex<()>,
}

impl Shared {
    pub(crate) fn new(
        config: SessionConfig,
        credentials: Arc<dyn CredentialProvider>,
        callbacks: SessionCallbacks,
    ) -> Self {
        let mut machine = StateMachine::new();
        let observer = machine.observer();
        let (state_tx, state_rx) = watch::channel(machine.state());
        machine.subscribe(Box::new(move |t| {
            state_tx.send_replace(t.to);
        }));

        Self {
            id: SessionId::new(),
            config,
            credentials,
            callbacks,
            machine: Mutex::new(machine),
            observer,
            state_rx,
            stream: Mutex::new(StreamSlot {
                generation: 0,
                assembler: StreamAssembler::new(),
            }),
            connection: Mutex::new(None),
            revoked: AtomicBool::new(false),
            reconnect_attempts: AtomicU32::new(0),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.observer.get()
    }

    pub(crate) fn observer(&self) -> StateObserver {
        self.observer.clone()
    }

    pub(crate) fn subscribe(&self, listener: crate::state::StateListener) {
        self.machine.lock().subscribe(listener);
    }

    pub(crate) fn is_streaming(&self) -> bool {
        self.stream.lock().assembler.is_active()
    }

    pub(crate) fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    /// Wait until the session has left `connecting`.
    pub(crate) async fn settled(&self) -> ConnectionState {
        let mut rx = self.state_rx.clone();
        let settled = match rx.wait_for(|s| *s != ConnectionState::Connecting).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    pub(crate) fn generation(&self) -> u64 {
        self.stream.lock().generation
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub(crate) async fn connect(self: &Arc<Self>) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.connect_locked().await
    }

    /// Reconnect on behalf of the connection retired at `generation`. Does
    /// nothing if the session moved on (disconnect, revoke, another connect)
    /// before the lifecycle lock was taken.
    pub(crate) async fn reconnect(self: &Arc<Self>, generation: u64) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_revoked() || !self.is_current(generation) {
            debug!(session = %self.id.short(), generation, "Reconnect cancelled");
            return Ok(());
        }
        self.connect_locked().await
    }

    /// Caller holds `lifecycle`.
    async fn connect_locked(self: &Arc<Self>) -> Result<(), SessionError> {
        if self.is_revoked() {
            return Err(SessionError::Revoked);
        }
        if matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            debug!(session = %self.id.short(), "Connect ignored; already connecting or connected");
            return Ok(());
        }

        let Some(credential) = self.credentials.credential().await else {
            warn!(session = %self.id.short(), "No credential available; staying disconnected");
            return Err(SessionError::MissingCredential);
        };

        let generation = self.stream.lock().advance();
        self.machine.lock().transition(ConnectionState::Connecting)?;

        let handshake = match Connection::open(&self.config.transport, &credential).await {
            Ok(handshake) => handshake,
            Err(err) => {
                self.fail_connecting(&err);
                return Err(err.into());
            }
        };

        let handler: Arc<dyn FrameHandler> = Arc::new(SessionLink {
            shared: Arc::downgrade(self),
            generation,
        });
        let slot = self.stream.lock();
        if slot.generation != generation {
            // The handle was dropped while we were handshaking.
            debug!(session = %self.id.short(), generation, "Discarding handshake of a torn-down session");
            return Err(SessionError::NotConnected);
        }
        // Store the handle before the I/O task runs, so `connected` can only
        // be observed once `send` has somewhere to queue frames.
        *self.connection.lock() = Some(handshake.start(handler));
        drop(slot);
        debug!(session = %self.id.short(), generation, "Awaiting session acknowledgment");
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.shutdown().await;
    }

    pub(crate) async fn revoke(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.revoked.store(true, Ordering::Release);
        self.shutdown().await;
        info!(session = %self.id.short(), "Session revoked");
    }

    async fn shutdown(&self) {
        self.stream.lock().advance();
        let connection = self.connection.lock().take();
        if let Some(connection) = connection {
            connection.close().await;
        }
        self.machine.lock().reset();
        self.reconnect_attempts.store(0, Ordering::Release);
        info!(session = %self.id.short(), "Chat session disconnected");
    }

    /// Synchronous teardown used when the public handle is dropped.
    pub(crate) fn teardown(&self) {
        self.stream.lock().advance();
        if let Some(connection) = self.connection.lock().take() {
            connection.abort();
        }
        self.machine.lock().reset();
    }

    fn fail_connecting(&self, err: &TransportError) {
        let _ = self.machine.lock().transition(ConnectionState::Error);
        self.callbacks.report_error(&err.clone().into());
        self.machine.lock().reset();
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    pub(crate) fn send(&self, request: &ChatRequest) -> Result<(), SessionError> {
        let state = self.state();
        if state != ConnectionState::Connected {
            debug!(session = %self.id.short(), %state, "Send rejected");
            return Err(SessionError::NotConnected);
        }

        let guard = self.connection.lock();
        let connection = guard.as_ref().ok_or(SessionError::NotConnected)?;
        connection
            .send(request.to_frame())
            .map_err(|_| SessionError::NotConnected)?;

        info!(
            session = %self.id.short(),
            agent_id = request.agent_id,
            thread_id = ?request.thread_id,
            chars = request.message.len(),
            "Chat request sent"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Inbound (called on the connection's I/O task)
    // -----------------------------------------------------------------------

    fn is_current(&self, generation: u64) -> bool {
        self.stream.lock().generation == generation
    }

    fn acknowledge(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        match self.machine.lock().transition(ConnectionState::Connected) {
            Ok(true) => {
                self.reconnect_attempts.store(0, Ordering::Release);
                info!(session = %self.id.short(), "Chat session established");
            }
            Ok(false) => debug!("Duplicate session acknowledgment"),
            Err(e) => warn!(error = %e, "Ignoring session acknowledgment"),
        }
    }

    fn route(&self, generation: u64, frame: InboundFrame) {
        let outcome = {
            let mut slot = self.stream.lock();
            if slot.generation != generation {
                return;
            }
            slot.assembler.apply(frame, Instant::now())
        };
        if let Some(outcome) = outcome {
            self.callbacks.deliver(outcome);
        }
    }

    fn connection_lost(self: &Arc<Self>, generation: u64, err: TransportError) {
        {
            let mut slot = self.stream.lock();
            if slot.generation != generation {
                debug!(generation, "Close of a retired connection");
                return;
            }
            slot.advance();
        }
        // The I/O task is finishing on its own; just release the handle.
        drop(self.connection.lock().take());

        warn!(session = %self.id.short(), error = %err, "Chat connection lost");
        let was_connecting = self.state() == ConnectionState::Connecting;
        if was_connecting {
            self.fail_connecting(&err);
        } else {
            self.machine.lock().reset();
            self.callbacks.report_error(&err.clone().into());
        }

        if err.is_retryable() && !self.is_revoked() {
            self.schedule_reconnect();
        }
    }

    // -----------------------------------------------------------------------
    // Reconnect
    // -----------------------------------------------------------------------

    fn schedule_reconnect(self: &Arc<Self>) {
        let policy = &self.config.reconnect;
        if !policy.enabled {
            return;
        }
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::AcqRel) + 1;
        if !policy.allows(attempt) {
            warn!(session = %self.id.short(), attempts = attempt - 1, "Giving up on reconnecting");
            return;
        }

        let delay = policy.delay_for(attempt);
        let generation = self.generation();
        let weak = Arc::downgrade(self);
        info!(session = %self.id.short(), attempt, ?delay, "Reconnecting");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if let Err(SessionError::Transport(err)) = shared.reconnect(generation).await {
                if err.is_retryable() {
                    shared.schedule_reconnect();
                }
            }
        });
    }
}

/// The frame handler registered on one connection.
struct SessionLink {
    shared: Weak<Shared>,
    generation: u64,
}

impl FrameHandler for SessionLink {
    fn on_frame(&self, frame: InboundFrame) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        match frame {
            InboundFrame::Connected => shared.acknowledge(self.generation),
            frame => shared.route(self.generation, frame),
        }
    }

    fn on_closed(&self, reason: CloseReason) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        match reason {
            // Whoever asked for the close settles the state.
            CloseReason::Requested => {}
            CloseReason::Lost(err) => shared.connection_lost(self.generation, err),
        }
    }
}
