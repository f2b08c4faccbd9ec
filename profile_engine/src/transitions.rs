/// Profile Registry v1 — Centralized Transition Logic
///
/// ALL state-mutation logic lives here. Every function clones the input
/// state and mutates the clone; the original state is never touched.
/// No clock reads, no I/O, no logging: timestamps are injected by the
/// runtime, diagnostics are the caller's responsibility.

use chrono::{DateTime, Utc};

use crate::domain::{CartItem, Profile, RegistryState};
use crate::events::{MappingEvent, MappingEventDraft, MAX_HISTORY_ENTRIES};
use crate::mapping::invert_mappings;
use crate::state::create_initial_state;

/// Register a profile, wholesale replacing any prior profile with the
/// same id.
///
/// The reverse mapping is always recomputed from `package_mappings`;
/// whatever the caller put in `reverse_mapping` is discarded. There is
/// no error path: target-id collisions are accepted with last-write-wins
/// inversion semantics.
pub fn register_profile(state: &RegistryState, mut profile: Profile) -> RegistryState {
    let mut new_state = state.clone();
    profile.reverse_mapping = invert_mappings(&profile.package_mappings);
    new_state.profiles.insert(profile.id.clone(), profile);
    new_state
}

/// Activate a registered profile.
///
/// An unknown id returns the state unchanged (the runtime owns the
/// diagnostic). Otherwise the outgoing active id, possibly None, is
/// recorded as previous before the new id is installed.
pub fn activate_profile(state: &RegistryState, profile_id: &str) -> RegistryState {
    let mut new_state = state.clone();
    if !new_state.profiles.contains_key(profile_id) {
        return new_state;
    }
    new_state.previous_profile_id = new_state.active_profile_id.take();
    new_state.active_profile_id = Some(profile_id.to_string());
    new_state
}

/// Deactivate whatever profile is active.
///
/// Idempotent: with nothing active this records None as previous and
/// stays inactive.
pub fn deactivate_profile(state: &RegistryState) -> RegistryState {
    let mut new_state = state.clone();
    new_state.previous_profile_id = new_state.active_profile_id.take();
    new_state
}

/// Store an owned copy of the cart line items.
pub fn set_cart_snapshot(state: &RegistryState, items: &[CartItem]) -> RegistryState {
    let mut new_state = state.clone();
    new_state.original_cart_snapshot = Some(items.to_vec());
    new_state
}

/// Drop the stored cart snapshot, if any.
pub fn clear_cart_snapshot(state: &RegistryState) -> RegistryState {
    let mut new_state = state.clone();
    new_state.original_cart_snapshot = None;
    new_state
}

/// Append a history event stamped with `timestamp`, then truncate the
/// history to the most recent MAX_HISTORY_ENTRIES. Oldest entries are
/// dropped first; relative order of the survivors is preserved.
pub fn add_mapping_event(
    state: &RegistryState,
    draft: MappingEventDraft,
    timestamp: DateTime<Utc>,
) -> RegistryState {
    let mut new_state = state.clone();
    new_state.mapping_history.push(MappingEvent {
        timestamp,
        profile_id: draft.profile_id,
        action: draft.action,
        items_affected: draft.items_affected,
        previous_profile_id: draft.previous_profile_id,
    });
    let len = new_state.mapping_history.len();
    if len > MAX_HISTORY_ENTRIES {
        new_state.mapping_history = new_state
            .mapping_history
            .split_off(len - MAX_HISTORY_ENTRIES);
    }
    new_state
}

/// Empty the history unconditionally.
pub fn clear_history(state: &RegistryState) -> RegistryState {
    let mut new_state = state.clone();
    new_state.mapping_history.clear();
    new_state
}

/// Full state replacement with the documented initial state.
pub fn reset() -> RegistryState {
    create_initial_state()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MappingAction;
    use std::collections::BTreeMap;

    fn profile(id: &str, pairs: &[(i64, i64)]) -> Profile {
        Profile {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: Some("test profile".to_string()),
            package_mappings: pairs.iter().copied().collect(),
            reverse_mapping: BTreeMap::new(),
            is_active: None,
            priority: None,
        }
    }

    fn draft(n: u32) -> MappingEventDraft {
        MappingEventDraft {
            profile_id: format!("p{}", n),
            action: MappingAction::Applied,
            items_affected: n,
            previous_profile_id: None,
        }
    }

    /// Fixed timestamp: the transition layer never reads a clock.
    fn ts() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    // ── Test 1: registration derives the reverse mapping ────────────

    #[test]
    fn register_derives_reverse_mapping() {
        let mut p = profile("p1", &[(100, 200), (101, 201)]);
        // Caller-supplied garbage in the derived field must be discarded.
        p.reverse_mapping.insert(7, 7);
        let state = register_profile(&create_initial_state(), p);

        let stored = &state.profiles["p1"];
        assert_eq!(stored.reverse_mapping.len(), 2);
        assert_eq!(stored.reverse_mapping.get(&200), Some(&100));
        assert_eq!(stored.reverse_mapping.get(&201), Some(&101));
    }

    // ── Test 2: re-registration overwrites wholesale ────────────────

    #[test]
    fn reregistration_overwrites_wholesale() {
        let state = register_profile(&create_initial_state(), profile("p1", &[(5, 6)]));
        let state = register_profile(&state, profile("p1", &[(5, 7)]));

        assert_eq!(state.profiles.len(), 1);
        let stored = &state.profiles["p1"];
        assert_eq!(stored.package_mappings.get(&5), Some(&7));
        assert_eq!(stored.reverse_mapping.get(&7), Some(&5));
        assert_eq!(stored.reverse_mapping.get(&6), None);
    }

    // ── Test 3: activation records the previous id ──────────────────

    #[test]
    fn activation_tracks_previous_id() {
        let state = register_profile(&create_initial_state(), profile("p1", &[]));
        let state = register_profile(&state, profile("p2", &[]));

        let state = activate_profile(&state, "p1");
        assert_eq!(state.active_profile_id.as_deref(), Some("p1"));
        assert_eq!(state.previous_profile_id, None);

        let state = activate_profile(&state, "p2");
        assert_eq!(state.active_profile_id.as_deref(), Some("p2"));
        assert_eq!(state.previous_profile_id.as_deref(), Some("p1"));
    }

    // ── Test 4: unknown activation leaves the state unchanged ───────

    #[test]
    fn unknown_activation_is_noop() {
        let state = register_profile(&create_initial_state(), profile("p1", &[(1, 2)]));
        let state = activate_profile(&state, "p1");
        let after = activate_profile(&state, "ghost");
        assert_eq!(after, state);
    }

    // ── Test 5: deactivation is idempotent ──────────────────────────

    #[test]
    fn deactivation_is_idempotent() {
        let state = register_profile(&create_initial_state(), profile("p1", &[]));
        let state = activate_profile(&state, "p1");

        let state = deactivate_profile(&state);
        assert_eq!(state.active_profile_id, None);
        assert_eq!(state.previous_profile_id.as_deref(), Some("p1"));

        // Second deactivation: null to null, still recorded as previous.
        let state = deactivate_profile(&state);
        assert_eq!(state.active_profile_id, None);
        assert_eq!(state.previous_profile_id, None);
    }

    // ── Test 6: history is bounded to the newest 50 ─────────────────

    #[test]
    fn history_keeps_newest_fifty() {
        let mut state = create_initial_state();
        for n in 0..60 {
            state = add_mapping_event(&state, draft(n), ts());
        }
        assert_eq!(state.mapping_history.len(), MAX_HISTORY_ENTRIES);
        // Entries 10..60 survive, in original relative order.
        for (i, event) in state.mapping_history.iter().enumerate() {
            assert_eq!(event.items_affected, (i + 10) as u32);
        }
    }

    // ── Test 7: clear_history and reset ─────────────────────────────

    #[test]
    fn clear_history_empties_the_log() {
        let mut state = create_initial_state();
        for n in 0..5 {
            state = add_mapping_event(&state, draft(n), ts());
        }
        let state = clear_history(&state);
        assert!(state.mapping_history.is_empty());
    }

    #[test]
    fn reset_restores_initial_state() {
        let state = register_profile(&create_initial_state(), profile("p1", &[(1, 2)]));
        let state = activate_profile(&state, "p1");
        let state = set_cart_snapshot(
            &state,
            &[CartItem {
                package_id: 1,
                name: "widget".to_string(),
                quantity: 2,
                attributes: serde_json::Value::Null,
            }],
        );
        let state = add_mapping_event(&state, draft(1), ts());
        assert_ne!(state, create_initial_state());

        assert_eq!(reset(), create_initial_state());
    }

    // ── Test 8: cart snapshot stores an independent copy ────────────

    #[test]
    fn cart_snapshot_is_independent() {
        let mut items = vec![CartItem {
            package_id: 100,
            name: "widget".to_string(),
            quantity: 1,
            attributes: serde_json::json!({"color": "red"}),
        }];
        let state = set_cart_snapshot(&create_initial_state(), &items);

        // Mutating the caller's items must not affect the snapshot.
        items[0].quantity = 99;
        let stored = state.original_cart_snapshot.as_ref().unwrap();
        assert_eq!(stored[0].quantity, 1);

        let state = clear_cart_snapshot(&state);
        assert_eq!(state.original_cart_snapshot, None);
    }

    // ── Test 9: transitions never mutate their input ────────────────

    #[test]
    fn input_state_is_never_mutated() {
        let original = register_profile(&create_initial_state(), profile("p1", &[(1, 2)]));
        let snapshot = original.clone();

        let _ = activate_profile(&original, "p1");
        let _ = register_profile(&original, profile("p2", &[]));
        let _ = add_mapping_event(&original, draft(0), ts());
        let _ = deactivate_profile(&original);

        assert_eq!(original, snapshot);
    }
}
