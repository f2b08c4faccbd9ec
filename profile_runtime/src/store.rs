//! Reactive store wrapper — current state plus change subscribers.
//!
//! Single-threaded and synchronous: `set_state` installs the new state
//! and then notifies every subscriber before returning, so any read
//! after a write observes the new state. Subscribers may batch or
//! dedupe on their own; the store delivers once per mutation.

use profile_engine::domain::RegistryState;

/// Handle returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// Change listener, invoked with the state just installed.
pub type Listener = Box<dyn FnMut(&RegistryState)>;

/// Holds the current registry state and notifies subscribers on change.
pub struct RegistryStore {
    state: RegistryState,
    subscribers: Vec<(SubscriberId, Listener)>,
    next_id: u64,
}

impl RegistryStore {
    pub fn new(initial: RegistryState) -> Self {
        Self {
            state: initial,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// Install `update(previous)` as the new state and notify.
    pub fn set_state<F>(&mut self, update: F)
    where
        F: FnOnce(&RegistryState) -> RegistryState,
    {
        self.state = update(&self.state);
        self.notify();
    }

    /// Replace the state wholesale and notify.
    pub fn replace_state(&mut self, state: RegistryState) {
        self.state = state;
        self.notify();
    }

    /// Register a change listener. The listener is not called with the
    /// current state on registration, only on subsequent changes.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        for (_, listener) in self.subscribers.iter_mut() {
            listener(&self.state);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
