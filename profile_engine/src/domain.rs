/// Profile Registry v1 — Core Domain Types
///
/// Pure data. No behaviour, no transition logic.
/// All package ids: i64.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::events::MappingEvent;

// ── Core Domain Types ──────────────────────────────────────────────

/// A named bundle of id-remapping rules plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// original id → mapped id. Authoritative source of truth.
    pub package_mappings: BTreeMap<i64, i64>,
    /// mapped id → original id. Derived cache, rebuilt on every
    /// registration. Never authoritative.
    pub reverse_mapping: BTreeMap<i64, i64>,
    /// Metadata only. Not tied to `RegistryState::active_profile_id`.
    pub is_active: Option<bool>,
    pub priority: Option<i64>,
}

/// A single cart line item. `attributes` is an opaque payload the
/// registry copies verbatim and never inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartItem {
    pub package_id: i64,
    pub name: String,
    pub quantity: u32,
    pub attributes: serde_json::Value,
}

/// Complete registry state snapshot. Exclusively owned by the registry;
/// mutated only through `transitions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryState {
    pub profiles: BTreeMap<String, Profile>,
    /// At most one active profile at a time. When set, must be a key
    /// in `profiles` (see `invariants`).
    pub active_profile_id: Option<String>,
    /// Recorded on every activation change. Observability only.
    pub previous_profile_id: Option<String>,
    /// Append-only, bounded to `events::MAX_HISTORY_ENTRIES`.
    pub mapping_history: Vec<MappingEvent>,
    /// Cart lines captured before a mapping was applied.
    pub original_cart_snapshot: Option<Vec<CartItem>>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            profiles: BTreeMap::new(),
            active_profile_id: None,
            previous_profile_id: None,
            mapping_history: Vec::new(),
            original_cart_snapshot: None,
        }
    }
}
