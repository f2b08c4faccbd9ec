/// Profile Registry v1 — Invariant Checks
///
/// Non-panicking validation used when restoring persisted state.
/// Normal registry operations uphold these by construction, so the
/// checks run only at the trust boundary.

use crate::domain::RegistryState;
use crate::events::MAX_HISTORY_ENTRIES;

/// Run all invariant checks. Returns `Err(message)` on the first
/// failure, `Ok(())` if all pass.
pub fn try_validate_registry(state: &RegistryState) -> Result<(), String> {
    try_check_active_profile_ref(state)?;
    try_check_history_bound(state)?;
    Ok(())
}

/// INV-1: active_profile_id, when set, must reference a registered
/// profile. previous_profile_id is observability-only and may dangle.
fn try_check_active_profile_ref(state: &RegistryState) -> Result<(), String> {
    if let Some(id) = &state.active_profile_id {
        if !state.profiles.contains_key(id) {
            return Err(format!(
                "Invariant violation: [INVARIANT:active_profile_ref] \
                 active profile {:?} is not in the profile table",
                id
            ));
        }
    }
    Ok(())
}

/// INV-2: the mapping history never exceeds MAX_HISTORY_ENTRIES.
fn try_check_history_bound(state: &RegistryState) -> Result<(), String> {
    if state.mapping_history.len() > MAX_HISTORY_ENTRIES {
        return Err(format!(
            "Invariant violation: [INVARIANT:history_bound] \
             history has {} entries, limit is {}",
            state.mapping_history.len(),
            MAX_HISTORY_ENTRIES
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
