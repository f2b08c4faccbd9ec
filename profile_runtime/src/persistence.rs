//! Persistence adapter — fire-and-forget state storage.
//!
//! The registry mutates in-memory state synchronously; this adapter is
//! invoked after every change with no acknowledgement required. Storage
//! failures are logged and swallowed, never surfaced to the registry.
//! On fresh or corrupt storage, loading yields the initial empty state.

use log::warn;

use profile_engine::domain::RegistryState;
use profile_engine::state::create_initial_state;

use crate::kv_store::KvStore;
use crate::state_codec::{encode_state, restore_state};

/// Default storage key for the registry blob.
pub const DEFAULT_STORAGE_KEY: &str = "profile-registry";

/// Serializes registry state to a single key in a backing store.
pub struct PersistenceAdapter {
    store: Box<dyn KvStore>,
    key: String,
}

impl PersistenceAdapter {
    /// Wrap a store, persisting under `DEFAULT_STORAGE_KEY`.
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Wrap a store, persisting under a caller-chosen key.
    pub fn with_key(store: Box<dyn KvStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// Storage key this adapter persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted state, degrading to the initial empty state.
    ///
    /// An absent key is a normal fresh start. A read, decode, or
    /// invariant failure is logged and likewise degrades; the registry
    /// never sees the error.
    pub fn load_state(&mut self) -> RegistryState {
        let blob = match self.store.get_item(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return create_initial_state(),
            Err(e) => {
                warn!(
                    "persistence: read of key {:?} failed, starting fresh: {}",
                    self.key, e
                );
                return create_initial_state();
            }
        };
        match restore_state(&blob) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "persistence: stored state under {:?} is unusable, starting fresh: {}",
                    self.key, e
                );
                create_initial_state()
            }
        }
    }

    /// Persist the given state. Best-effort: failures are logged and
    /// swallowed, there is no retry.
    pub fn save_state(&mut self, state: &RegistryState) {
        let blob = match encode_state(state) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("persistence: state encoding failed, skipping save: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.key, &blob) {
            warn!(
                "persistence: write of key {:?} failed, state not saved: {}",
                self.key, e
            );
        }
    }

    /// Remove the persisted blob. Best-effort.
    pub fn clear(&mut self) {
        if let Err(e) = self.store.remove_item(&self.key) {
            warn!(
                "persistence: removal of key {:?} failed: {}",
                self.key, e
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use profile_engine::domain::Profile;
    use profile_engine::transitions::{activate_profile, register_profile};

    use crate::kv_store::MemoryStore;

    fn adapter() -> PersistenceAdapter {
        PersistenceAdapter::new(Box::new(MemoryStore::new()))
    }

    fn sample_state() -> RegistryState {
        let profile = Profile {
            id: "p1".to_string(),
            name: "P1".to_string(),
            description: None,
            package_mappings: [(5, 6)].into_iter().collect(),
            reverse_mapping: BTreeMap::new(),
            is_active: None,
            priority: None,
        };
        let state = register_profile(&create_initial_state(), profile);
        activate_profile(&state, "p1")
    }

    #[test]
    fn fresh_store_loads_initial_state() {
        let mut adapter = adapter();
        assert_eq!(adapter.load_state(), create_initial_state());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut adapter = adapter();
        let state = sample_state();
        adapter.save_state(&state);
        assert_eq!(adapter.load_state(), state);
    }

    #[test]
    fn corrupt_blob_degrades_to_initial_state() {
        let mut store = MemoryStore::new();
        store.set_item(DEFAULT_STORAGE_KEY, "not a blob").unwrap();
        let mut adapter = PersistenceAdapter::new(Box::new(store));
        assert_eq!(adapter.load_state(), create_initial_state());
    }

    #[test]
    fn clear_removes_the_blob() {
        let mut adapter = adapter();
        adapter.save_state(&sample_state());
        adapter.clear();
        assert_eq!(adapter.load_state(), create_initial_state());
    }
}
