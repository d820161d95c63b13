//! Client connection-state machine with publish/subscribe observers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Connectivity of the client's persistent channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Called with `(previous, current)` on every transition.
pub type StateObserver = Arc<dyn Fn(ConnectionState, ConnectionState) + Send + Sync>;

struct Inner {
    state: ConnectionState,
    observers: Vec<(u64, StateObserver)>,
    next_observer: u64,
}

/// Shared state machine. Clones refer to the same state.
///
/// Transitions: `Disconnected | Error -> Connecting`, `Connecting -> Connected`,
/// `Connecting -> Error`, `Connected -> Disconnected`. Anything else is
/// rejected and leaves the state untouched.
#[derive(Clone)]
pub struct SessionStateMachine {
    inner: Arc<Mutex<Inner>>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStateMachine")
            .field("state", &self.state())
            .finish()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                observers: Vec::new(),
                next_observer: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Register an observer. It sees future transitions only; dropping the
    /// returned handle unsubscribes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_observer;
        inner.next_observer += 1;
        inner.observers.push((id, Arc::new(observer)));
        Subscription {
            machine: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn begin_connect(&self) -> bool {
        self.transition(ConnectionState::Connecting, |from| {
            matches!(from, ConnectionState::Disconnected | ConnectionState::Error)
        })
    }

    pub fn connected(&self) -> bool {
        self.transition(ConnectionState::Connected, |from| {
            from == ConnectionState::Connecting
        })
    }

    pub fn failed(&self) -> bool {
        self.transition(ConnectionState::Error, |from| {
            from == ConnectionState::Connecting
        })
    }

    pub fn closed(&self) -> bool {
        self.transition(ConnectionState::Disconnected, |from| {
            from == ConnectionState::Connected
        })
    }

    fn transition(&self, to: ConnectionState, allowed: impl Fn(ConnectionState) -> bool) -> bool {
        let (from, observers) = {
            let mut inner = self.lock();
            let from = inner.state;
            if !allowed(from) {
                tracing::debug!("Ignoring connection transition {from} -> {to}");
                return false;
            }
            inner.state = to;
            let observers: Vec<StateObserver> =
                inner.observers.iter().map(|(_, o)| o.clone()).collect();
            (from, observers)
        };

        tracing::debug!("Connection state {from} -> {to}");
        // Called outside the lock so observers may query or subscribe.
        for observer in observers {
            observer(from, to);
        }
        true
    }
}

/// Observer registration handle.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    machine: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.machine.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.observers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::*;

    fn recorder(
        machine: &SessionStateMachine,
    ) -> (Subscription, Arc<Mutex<Vec<(ConnectionState, ConnectionState)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = machine.subscribe(move |from, to| sink.lock().unwrap().push((from, to)));
        (sub, seen)
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(SessionStateMachine::new().state(), Disconnected);
    }

    #[test]
    fn test_happy_path_and_close() {
        let machine = SessionStateMachine::new();
        let (_sub, seen) = recorder(&machine);

        assert!(machine.begin_connect());
        assert!(machine.connected());
        assert!(machine.closed());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (Disconnected, Connecting),
                (Connecting, Connected),
                (Connected, Disconnected)
            ]
        );
    }

    #[test]
    fn test_failure_then_reconnect() {
        let machine = SessionStateMachine::new();
        assert!(machine.begin_connect());
        assert!(machine.failed());
        assert_eq!(machine.state(), Error);
        assert!(machine.begin_connect());
        assert_eq!(machine.state(), Connecting);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let machine = SessionStateMachine::new();
        let (_sub, seen) = recorder(&machine);
        assert!(!machine.connected());
        assert!(!machine.failed());
        assert!(!machine.closed());
        assert!(machine.begin_connect());
        assert!(!machine.begin_connect());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unsubscribe_and_multiple_observers() {
        let machine = SessionStateMachine::new();
        let (first, first_seen) = recorder(&machine);
        let (_second, second_seen) = recorder(&machine);
        assert_eq!(machine.observer_count(), 2);

        machine.begin_connect();
        first.unsubscribe();
        assert_eq!(machine.observer_count(), 1);
        machine.failed();

        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert_eq!(second_seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let machine = SessionStateMachine::new();
        machine.begin_connect();
        let (_sub, seen) = recorder(&machine);
        assert!(seen.lock().unwrap().is_empty());
        machine.connected();
        assert_eq!(*seen.lock().unwrap(), vec![(Connecting, Connected)]);
    }

    #[test]
    fn test_observer_may_read_state() {
        let machine = SessionStateMachine::new();
        let observed = machine.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let _sub = machine.subscribe(move |_, _| *sink.lock().unwrap() = Some(observed.state()));
        machine.begin_connect();
        assert_eq!(*seen.lock().unwrap(), Some(Connecting));
    }
}
