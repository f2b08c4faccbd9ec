#![forbid(unsafe_code)]

//! Profile Registry v1 — Rust Runtime
//!
//! Wraps the pure mapping engine with persistence, a pairs-form state
//! codec, a reactive store, and the `ProfileRegistry` facade.
//!
//! No mapping logic lives here — all transitions and lookups are
//! delegated to `profile_engine`.

pub mod kv_store;
pub mod state_codec;
pub mod persistence;
pub mod store;
pub mod registry;
