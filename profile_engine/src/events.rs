/// Profile Registry v1 — History Event Definitions
///
/// Events are pure data. They carry an audit record only and contain
/// ZERO transition logic. The timestamp is assigned by the runtime when
/// an event is appended, never by the caller.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Maximum retained history entries. Oldest entries are dropped first.
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// What happened to the cart with respect to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingAction {
    Applied,
    Reverted,
    Switched,
}

/// A single audit record in the mapping history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingEvent {
    pub timestamp: DateTime<Utc>,
    pub profile_id: String,
    pub action: MappingAction,
    pub items_affected: u32,
    /// Present for `switched` events.
    pub previous_profile_id: Option<String>,
}

/// Caller-supplied event fields. Stamped into a `MappingEvent` on append.
#[derive(Debug, Clone)]
pub struct MappingEventDraft {
    pub profile_id: String,
    pub action: MappingAction,
    pub items_affected: u32,
    pub previous_profile_id: Option<String>,
}
