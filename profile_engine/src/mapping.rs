/// Profile Registry v1 — Mapping Lookups
///
/// Pure read-only computations over RegistryState. Every lookup is
/// total: it degrades to identity or None rather than failing.

use std::collections::BTreeMap;

use crate::domain::{Profile, RegistryState};

/// Invert a forward mapping into its reverse form.
///
/// Iterates in ascending original-id order. If two original ids map to
/// the same target, the last one written wins, so the largest colliding
/// original id survives.
pub fn invert_mappings(forward: &BTreeMap<i64, i64>) -> BTreeMap<i64, i64> {
    let mut reverse = BTreeMap::new();
    for (original, mapped) in forward {
        reverse.insert(*mapped, *original);
    }
    reverse
}

/// The profile currently governing id translation, if any.
///
/// None when no profile is active or, defensively, when the active id
/// is missing from the table.
pub fn active_profile(state: &RegistryState) -> Option<&Profile> {
    state
        .active_profile_id
        .as_ref()
        .and_then(|id| state.profiles.get(id))
}

/// Translate an original package id through the active profile.
/// Identity when no profile is active or the id is unmapped.
pub fn mapped_package_id(state: &RegistryState, original_id: i64) -> i64 {
    match active_profile(state) {
        Some(profile) => profile
            .package_mappings
            .get(&original_id)
            .copied()
            .unwrap_or(original_id),
        None => original_id,
    }
}

/// Recover the original package id behind a mapped id.
///
/// Consults the derived reverse mapping first (O(log n)). If the entry
/// is absent, e.g. a stale cache from an older persisted state or an
/// entry shadowed by a forward collision, falls back to scanning the
/// authoritative forward mapping and returns the first original id
/// (ascending key order) whose mapped value matches. None when no
/// profile is active or nothing matches.
pub fn original_package_id(state: &RegistryState, mapped_id: i64) -> Option<i64> {
    let profile = active_profile(state)?;
    if let Some(original) = profile.reverse_mapping.get(&mapped_id) {
        return Some(*original);
    }
    profile
        .package_mappings
        .iter()
        .find(|(_, mapped)| **mapped == mapped_id)
        .map(|(original, _)| *original)
}

/// Translate a batch of ids eagerly, preserving input order.
pub fn map_package_ids(state: &RegistryState, ids: &[i64]) -> Vec<i64> {
    ids.iter().map(|id| mapped_package_id(state, *id)).collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;
    use crate::transitions::{activate_profile, register_profile};

    fn profile(id: &str, pairs: &[(i64, i64)]) -> Profile {
        Profile {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: None,
            package_mappings: pairs.iter().copied().collect(),
            reverse_mapping: BTreeMap::new(),
            is_active: None,
            priority: None,
        }
    }

    fn state_with_active(pairs: &[(i64, i64)]) -> RegistryState {
        let state = register_profile(&create_initial_state(), profile("p1", pairs));
        activate_profile(&state, "p1")
    }

    // ── Test 1: identity when nothing is active ─────────────────────

    #[test]
    fn identity_without_active_profile() {
        let state = create_initial_state();
        assert_eq!(mapped_package_id(&state, 42), 42);
        assert_eq!(mapped_package_id(&state, -7), -7);
        assert_eq!(original_package_id(&state, 42), None);
    }

    // ── Test 2: forward lookup and unmapped passthrough ─────────────

    #[test]
    fn forward_lookup_with_passthrough() {
        let state = state_with_active(&[(100, 200), (101, 201)]);
        assert_eq!(mapped_package_id(&state, 100), 200);
        assert_eq!(mapped_package_id(&state, 101), 201);
        assert_eq!(mapped_package_id(&state, 999), 999);
    }

    // ── Test 3: reverse lookup round trip ───────────────────────────

    #[test]
    fn reverse_round_trip() {
        let state = state_with_active(&[(100, 200), (101, 201)]);
        for original in [100, 101] {
            let mapped = mapped_package_id(&state, original);
            assert_eq!(original_package_id(&state, mapped), Some(original));
        }
        assert_eq!(original_package_id(&state, 555), None);
    }

    // ── Test 4: inversion collision keeps the last writer ───────────

    #[test]
    fn invert_collision_last_write_wins() {
        let forward: BTreeMap<i64, i64> = [(1, 9), (2, 9), (3, 8)].into_iter().collect();
        let reverse = invert_mappings(&forward);
        assert_eq!(reverse.len(), 2);
        assert_eq!(reverse.get(&9), Some(&2));
        assert_eq!(reverse.get(&8), Some(&3));
    }

    // ── Test 5: forward-scan fallback when the cache is stale ───────

    #[test]
    fn fallback_scans_forward_mapping() {
        let mut state = state_with_active(&[(1, 9), (3, 8)]);
        // Simulate a stale cache: wipe the derived index entirely.
        state
            .profiles
            .get_mut("p1")
            .unwrap()
            .reverse_mapping
            .clear();
        assert_eq!(original_package_id(&state, 9), Some(1));
        assert_eq!(original_package_id(&state, 8), Some(3));
        assert_eq!(original_package_id(&state, 7), None);
    }

    // ── Test 6: batch mapping preserves order ───────────────────────

    #[test]
    fn batch_mapping_preserves_order() {
        let state = state_with_active(&[(100, 200), (101, 201)]);
        assert_eq!(map_package_ids(&state, &[100, 101, 999]), vec![200, 201, 999]);
        assert_eq!(map_package_ids(&state, &[]), Vec::<i64>::new());
    }

    // ── Test 7: dangling active id degrades, never panics ───────────

    #[test]
    fn dangling_active_id_degrades() {
        let mut state = state_with_active(&[(100, 200)]);
        state.profiles.clear();
        assert!(active_profile(&state).is_none());
        assert_eq!(mapped_package_id(&state, 100), 100);
        assert_eq!(original_package_id(&state, 200), None);
    }
}
