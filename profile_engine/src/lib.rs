#![forbid(unsafe_code)]

/// Persisted-state schema v1. Bumping this requires a codec migration.
pub const STATE_SCHEMA_VERSION: u32 = 1;

pub mod domain;
pub mod events;
pub mod state;
pub mod mapping;
pub mod transitions;
pub mod invariants;
