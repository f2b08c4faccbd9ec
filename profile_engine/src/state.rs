/// Profile Registry v1 — State Construction

use std::collections::BTreeMap;

use crate::domain::RegistryState;

/// Create a fresh, empty RegistryState: no profiles, no active or
/// previous profile id, empty history, no cart snapshot.
pub fn create_initial_state() -> RegistryState {
    RegistryState {
        profiles: BTreeMap::new(),
        active_profile_id: None,
        previous_profile_id: None,
        mapping_history: Vec::new(),
        original_cart_snapshot: None,
    }
}
