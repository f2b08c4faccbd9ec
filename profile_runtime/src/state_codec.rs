//! State codec — registry state encoder/decoder for persistence.
//!
//! Pure codec layer. No side-effects, no clock reads.
//!
//! The canonical in-memory form keys profiles by id in a map. The
//! persisted form carries them as an ordered sequence of
//! `[id, Profile]` pairs so the blob survives a generic string
//! serializer; the map type never leaks into the serializer.
//!
//! - `to_persisted` / `from_persisted`: map form ↔ pairs form
//! - `encode_state`:  RegistryState → JSON blob (with integrity hash)
//! - `decode_state`:  JSON blob → RegistryState (strict, no defaults)
//! - `restore_state`: decode + invariant validation
//! - `state_hash`:    SHA-256 of the encoded state JSON (lowercase hex)

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use profile_engine::domain::{CartItem, Profile, RegistryState};
use profile_engine::events::MappingEvent;
use profile_engine::invariants::try_validate_registry;
use profile_engine::STATE_SCHEMA_VERSION;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible state codec failures.
#[derive(Debug)]
pub enum StateCodecError {
    /// JSON serialization failed.
    SerializationError(String),
    /// JSON deserialization failed (malformed, missing fields, unknown fields).
    DeserializationError(String),
    /// Blob was written by an incompatible schema version.
    SchemaVersionMismatch { expected: u32, found: u32 },
    /// Stored hash does not match the state payload.
    HashMismatch,
    /// Decoded state violates registry invariants.
    InvariantViolation(String),
}

impl fmt::Display for StateCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateCodecError::SerializationError(msg) => {
                write!(f, "SerializationError: {}", msg)
            }
            StateCodecError::DeserializationError(msg) => {
                write!(f, "DeserializationError: {}", msg)
            }
            StateCodecError::SchemaVersionMismatch { expected, found } => {
                write!(
                    f,
                    "SchemaVersionMismatch: expected {}, found {}",
                    expected, found
                )
            }
            StateCodecError::HashMismatch => {
                write!(f, "HashMismatch: blob hash does not match state payload")
            }
            StateCodecError::InvariantViolation(msg) => {
                write!(f, "InvariantViolation: {}", msg)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted forms
// ---------------------------------------------------------------------------

/// Registry state in its persisted shape: profiles as ordered
/// `[id, Profile]` pairs, every other field verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedState {
    pub profiles: Vec<(String, Profile)>,
    pub active_profile_id: Option<String>,
    pub previous_profile_id: Option<String>,
    pub mapping_history: Vec<MappingEvent>,
    pub original_cart_snapshot: Option<Vec<CartItem>>,
}

/// On-store blob envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateBlob {
    /// Schema version the blob was written with.
    pub schema_version: u32,
    /// JSON of the `PersistedState` (UTF-8).
    pub state_json: String,
    /// SHA-256 of `state_json`, lowercase hex.
    pub hash: String,
}

/// Convert the canonical map form into the pairs form.
/// BTreeMap iteration gives ascending-id pair order.
pub fn to_persisted(state: &RegistryState) -> PersistedState {
    PersistedState {
        profiles: state
            .profiles
            .iter()
            .map(|(id, profile)| (id.clone(), profile.clone()))
            .collect(),
        active_profile_id: state.active_profile_id.clone(),
        previous_profile_id: state.previous_profile_id.clone(),
        mapping_history: state.mapping_history.clone(),
        original_cart_snapshot: state.original_cart_snapshot.clone(),
    }
}

/// Convert the pairs form back into the canonical map form.
/// Duplicate ids in the pairs sequence: the last pair wins.
pub fn from_persisted(persisted: PersistedState) -> RegistryState {
    RegistryState {
        profiles: persisted.profiles.into_iter().collect(),
        active_profile_id: persisted.active_profile_id,
        previous_profile_id: persisted.previous_profile_id,
        mapping_history: persisted.mapping_history,
        original_cart_snapshot: persisted.original_cart_snapshot,
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

fn hex_digest(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Encode a RegistryState to a JSON blob string.
///
/// The pairs-form state JSON is wrapped in an envelope carrying the
/// schema version and an integrity hash of the payload.
pub fn encode_state(state: &RegistryState) -> Result<String, StateCodecError> {
    let state_json = serde_json::to_string(&to_persisted(state))
        .map_err(|e| StateCodecError::SerializationError(e.to_string()))?;
    let blob = StateBlob {
        schema_version: STATE_SCHEMA_VERSION,
        hash: hex_digest(&state_json),
        state_json,
    };
    serde_json::to_string(&blob).map_err(|e| StateCodecError::SerializationError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decode a JSON blob string into a RegistryState.
///
/// Strict deserialization: `deny_unknown_fields` on all types rejects
/// unexpected fields, missing required fields cause failure. Rejects
/// unknown schema versions and tampered payloads. No invariant
/// validation; use `restore_state` for validated loading.
pub fn decode_state(blob: &str) -> Result<RegistryState, StateCodecError> {
    let envelope: StateBlob = serde_json::from_str(blob)
        .map_err(|e| StateCodecError::DeserializationError(e.to_string()))?;

    if envelope.schema_version != STATE_SCHEMA_VERSION {
        return Err(StateCodecError::SchemaVersionMismatch {
            expected: STATE_SCHEMA_VERSION,
            found: envelope.schema_version,
        });
    }
    if hex_digest(&envelope.state_json) != envelope.hash {
        return Err(StateCodecError::HashMismatch);
    }

    let persisted: PersistedState = serde_json::from_str(&envelope.state_json)
        .map_err(|e| StateCodecError::DeserializationError(e.to_string()))?;
    Ok(from_persisted(persisted))
}

// ---------------------------------------------------------------------------
// Restore (decode + validate)
// ---------------------------------------------------------------------------

/// Decode a JSON blob and validate invariants immediately.
///
/// This is the safe entry point for loading state from storage.
pub fn restore_state(blob: &str) -> Result<RegistryState, StateCodecError> {
    let state = decode_state(blob)?;
    try_validate_registry(&state).map_err(StateCodecError::InvariantViolation)?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of the pairs-form state JSON. Lowercase hex string.
///
/// This is the same hash carried in the blob envelope and is used to
/// verify that a stored blob has not been tampered with.
pub fn state_hash(state: &RegistryState) -> Result<String, StateCodecError> {
    let state_json = serde_json::to_string(&to_persisted(state))
        .map_err(|e| StateCodecError::SerializationError(e.to_string()))?;
    Ok(hex_digest(&state_json))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
