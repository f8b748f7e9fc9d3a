//! Provider Replay
//!
//! Record/replay verification for resource provider implementations:
//!
//! - **Structural matching**: compare recorded patterns against live values
//!   with wildcards, strict-equality escapes and catch-all object keys
//! - **Replay**: feed recorded requests into a live provider and check each
//!   response or error against the recording
//! - **Upgrade consistency**: re-check recorded inputs with a new provider
//!   version and confirm it still computes the recorded diffs
//!
//! The engine lives in [`provider_replay_core`] and the transcript model in
//! [`provider_replay_types`]; both are re-exported here. The
//! `transcript-check` binary vets transcript files without a provider.

#![allow(clippy::result_large_err)]

pub use provider_replay_core::*;
pub use provider_replay_types::{projection, transcript, PropertyMap, Projection, ResourceKeyed};
