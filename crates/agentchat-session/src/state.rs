//! Connection lifecycle state machine.
//!
//! ```text
//! disconnected --open--> connecting --ack--> connected
//!      ^                     |                  |
//!      |                     v                  |
//!      +------------------ error                |
//!      +----------------------------------------+
//! ```
//!
//! `error` is reachable from every state and is always followed by either
//! `disconnected` or, when reconnecting, `connecting`.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Error = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Error,
            _ => ConnectionState::Disconnected,
        }
    }

    fn can_move_to(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
                | (Error, Disconnected)
                | (Error, Connecting)
                | (Disconnected | Connecting | Connected, Error)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// One observed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// Subscriber invoked synchronously for every transition.
pub type StateListener = Box<dyn Fn(Transition) + Send + Sync>;

/// Lock-free, read-only view of the current state.
#[derive(Debug, Clone)]
pub struct StateObserver {
    state: Arc<AtomicU8>,
}

impl StateObserver {
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Tracks the connection state and broadcasts every transition, in order,
/// to its subscribers.
pub struct StateMachine {
    state: ConnectionState,
    listeners: Vec<StateListener>,
    observed: Arc<AtomicU8>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            listeners: Vec::new(),
            observed: Arc::new(AtomicU8::new(ConnectionState::Disconnected as u8)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn observer(&self) -> StateObserver {
        StateObserver {
            state: Arc::clone(&self.observed),
        }
    }

    /// Register a subscriber. Subscribers run in registration order and must
    /// not call back into the state machine.
    pub fn subscribe(&mut self, listener: StateListener) {
        self.listeners.push(listener);
    }

    /// Move to `to`. Returns `Ok(false)` when already there (nothing is
    /// broadcast) and `InvalidTransition` for moves the lifecycle forbids.
    pub fn transition(&mut self, to: ConnectionState) -> Result<bool, SessionError> {
        let from = self.state;
        if from == to {
            return Ok(false);
        }
        if !from.can_move_to(to) {
            return Err(SessionError::InvalidTransition { from, to });
        }

        self.state = to;
        self.observed.store(to as u8, Ordering::Release);
        debug!(%from, %to, "Connection state changed");

        let transition = Transition { from, to };
        for listener in &self.listeners {
            listener(transition);
        }
        Ok(true)
    }

    /// Report a failure: pass through `error` and settle in `disconnected`.
    pub fn fail(&mut self) {
        // Both moves are legal from every state, so neither can be rejected.
        let _ = self.transition(ConnectionState::Error);
        let _ = self.transition(ConnectionState::Disconnected);
    }

    /// Settle in `disconnected` from any state.
    pub fn reset(&mut self) {
        let _ = self.transition(ConnectionState::Disconnected);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use ConnectionState::*;

    fn recorded(machine: &mut StateMachine) -> Arc<Mutex<Vec<Transition>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        machine.subscribe(Box::new(move |t| sink.lock().push(t)));
        seen
    }

    fn pairs(seen: &Mutex<Vec<Transition>>) -> Vec<(ConnectionState, ConnectionState)> {
        seen.lock().iter().map(|t| (t.from, t.to)).collect()
    }

    #[test]
    fn starts_disconnected() {
        let machine = StateMachine::new();
        assert_eq!(machine.state(), Disconnected);
        assert_eq!(machine.observer().get(), Disconnected);
    }

    #[test]
    fn happy_path_is_broadcast_in_order() {
        let mut machine = StateMachine::new();
        let seen = recorded(&mut machine);

        assert!(machine.transition(Connecting).unwrap());
        assert!(machine.transition(Connected).unwrap());
        assert!(machine.transition(Disconnected).unwrap());

        assert_eq!(
            pairs(&seen),
            vec![
                (Disconnected, Connecting),
                (Connecting, Connected),
                (Connected, Disconnected)
            ]
        );
    }

    #[test]
    fn failure_passes_through_error() {
        let mut machine = StateMachine::new();
        let seen = recorded(&mut machine);

        machine.transition(Connecting).unwrap();
        machine.fail();

        assert_eq!(
            pairs(&seen),
            vec![
                (Disconnected, Connecting),
                (Connecting, Error),
                (Error, Disconnected)
            ]
        );
        assert_eq!(machine.state(), Disconnected);
    }

    #[test]
    fn same_state_is_not_broadcast() {
        let mut machine = StateMachine::new();
        let seen = recorded(&mut machine);

        assert!(!machine.transition(Disconnected).unwrap());
        machine.reset();
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn forbidden_transitions_are_rejected() {
        let mut machine = StateMachine::new();
        let seen = recorded(&mut machine);

        let err = machine.transition(Connected).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: Disconnected,
                to: Connected
            }
        ));
        assert_eq!(machine.state(), Disconnected);
        assert!(seen.lock().is_empty());

        machine.transition(Connecting).unwrap();
        machine.transition(Connected).unwrap();
        assert!(machine.transition(Connecting).is_err());
    }

    #[test]
    fn error_may_lead_to_reconnect() {
        let mut machine = StateMachine::new();
        machine.transition(Connecting).unwrap();
        machine.transition(Error).unwrap();
        assert!(machine.transition(Connecting).unwrap());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut machine = StateMachine::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let order = Arc::clone(&order);
            machine.subscribe(Box::new(move |_| order.lock().push(id)));
        }

        machine.transition(Connecting).unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn observer_tracks_state() {
        let mut machine = StateMachine::new();
        let observer = machine.observer();
        machine.transition(Connecting).unwrap();
        assert_eq!(observer.get(), Connecting);
        machine.transition(Error).unwrap();
        assert_eq!(observer.get(), Error);
    }

    #[test]
    fn display_names() {
        assert_eq!(Disconnected.to_string(), "disconnected");
        assert_eq!(Connecting.to_string(), "connecting");
        assert_eq!(Connected.to_string(), "connected");
        assert_eq!(Error.to_string(), "error");
    }
}
