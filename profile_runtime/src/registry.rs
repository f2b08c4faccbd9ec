//! ProfileRegistry — business facade with persist-after-apply semantics.
//!
//! Every mutation runs in a fixed order:
//!   1. pure transition, installed through the reactive store
//!   2. subscribers notified with the new state
//!   3. best-effort save through the persistence adapter
//!
//! Failures degrade silently per the registry contract: activating an
//! unknown profile logs at error level and leaves state untouched, and
//! persistence failures never surface here.

use chrono::Utc;
use log::error;

use profile_engine::domain::{CartItem, Profile, RegistryState};
use profile_engine::events::{MappingEvent, MappingEventDraft};
use profile_engine::mapping;
use profile_engine::state::create_initial_state;
use profile_engine::transitions;

use crate::persistence::PersistenceAdapter;
use crate::store::{Listener, RegistryStore, SubscriberId};

/// In-memory table of named profiles with an active-profile pointer,
/// bounded audit history, and optional cart snapshot.
///
/// One instance per process, passed by reference to consumers. Tests
/// construct fresh instances.
pub struct ProfileRegistry {
    store: RegistryStore,
    persistence: Option<PersistenceAdapter>,
}

impl ProfileRegistry {
    /// Fresh in-memory registry with no persistence.
    pub fn new() -> Self {
        Self {
            store: RegistryStore::new(create_initial_state()),
            persistence: None,
        }
    }

    /// Registry backed by a persistence adapter. The initial state is
    /// whatever the adapter can load (fresh or corrupt storage yields
    /// the empty initial state).
    pub fn with_persistence(mut adapter: PersistenceAdapter) -> Self {
        let initial = adapter.load_state();
        Self {
            store: RegistryStore::new(initial),
            persistence: Some(adapter),
        }
    }

    /// Apply a pure transition, notify, then persist.
    fn apply<F>(&mut self, update: F)
    where
        F: FnOnce(&RegistryState) -> RegistryState,
    {
        self.store.set_state(update);
        if let Some(adapter) = &mut self.persistence {
            adapter.save_state(self.store.state());
        }
    }

    // ── Profile CRUD ───────────────────────────────────────────────

    /// Register a profile, overwriting any prior profile with the same
    /// id. The reverse mapping is recomputed from the forward mapping.
    pub fn register_profile(&mut self, profile: Profile) {
        self.apply(|state| transitions::register_profile(state, profile));
    }

    /// Make a registered profile the active one.
    ///
    /// Unknown id: logs at error level and leaves the state unchanged.
    /// Callers that need to detect the failure check `has_profile` or
    /// `get_active_profile`.
    pub fn activate_profile(&mut self, profile_id: &str) {
        if !self.store.state().profiles.contains_key(profile_id) {
            error!(
                "activate_profile: unknown profile id {:?}, state unchanged",
                profile_id
            );
            return;
        }
        self.apply(|state| transitions::activate_profile(state, profile_id));
    }

    /// Clear the active profile. Idempotent.
    pub fn deactivate_profile(&mut self) {
        self.apply(transitions::deactivate_profile);
    }

    // ── Mapping lookups ────────────────────────────────────────────

    /// Map an original package id through the active profile.
    /// Identity when inactive or unmapped.
    pub fn get_mapped_package_id(&self, original_id: i64) -> i64 {
        mapping::mapped_package_id(self.store.state(), original_id)
    }

    /// Recover the original id behind a mapped id, if any.
    pub fn get_original_package_id(&self, mapped_id: i64) -> Option<i64> {
        mapping::original_package_id(self.store.state(), mapped_id)
    }

    /// Map a batch of ids, preserving input order.
    pub fn map_package_ids(&self, ids: &[i64]) -> Vec<i64> {
        mapping::map_package_ids(self.store.state(), ids)
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn get_active_profile(&self) -> Option<&Profile> {
        mapping::active_profile(self.store.state())
    }

    pub fn has_profile(&self, profile_id: &str) -> bool {
        self.store.state().profiles.contains_key(profile_id)
    }

    pub fn get_profile_by_id(&self, profile_id: &str) -> Option<&Profile> {
        self.store.state().profiles.get(profile_id)
    }

    /// All registered profiles. No ordering guarantee.
    pub fn get_all_profiles(&self) -> Vec<&Profile> {
        self.store.state().profiles.values().collect()
    }

    /// The audit history, oldest first.
    pub fn mapping_history(&self) -> &[MappingEvent] {
        &self.store.state().mapping_history
    }

    /// The full current state.
    pub fn state(&self) -> &RegistryState {
        self.store.state()
    }

    // ── Cart snapshot ──────────────────────────────────────────────

    /// Store an independent copy of the cart line items.
    pub fn set_original_cart_snapshot(&mut self, items: &[CartItem]) {
        self.apply(|state| transitions::set_cart_snapshot(state, items));
    }

    pub fn clear_original_cart_snapshot(&mut self) {
        self.apply(transitions::clear_cart_snapshot);
    }

    // ── History ────────────────────────────────────────────────────

    /// Append an audit record, stamped with the current time. The
    /// registry does not emit these itself; callers record what
    /// happened after activation or cart operations if auditing is
    /// wanted. History is truncated to the newest 50 entries.
    pub fn add_mapping_event(&mut self, draft: MappingEventDraft) {
        let stamped = Utc::now();
        self.apply(|state| transitions::add_mapping_event(state, draft, stamped));
    }

    pub fn clear_history(&mut self) {
        self.apply(transitions::clear_history);
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Restore the entire state to its initial empty form. The new
    /// empty state is persisted like any other change.
    pub fn reset(&mut self) {
        self.apply(|_| transitions::reset());
    }

    /// Remove the persisted blob without touching in-memory state.
    pub fn clear_persisted(&mut self) {
        if let Some(adapter) = &mut self.persistence {
            adapter.clear();
        }
    }

    // ── Subscriptions ──────────────────────────────────────────────

    /// Register a change listener, called after every mutation.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriberId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
