//! Provider Replay Core
//!
//! Record/replay verification for resource providers.
//!
//! A transcript of recorded provider calls is fed back into a live
//! implementation and every response or error is checked against what was
//! recorded. Expected values are patterns, so generated identifiers and other
//! nondeterministic fields can be wildcarded.
//!
//! # Core Modules
//!
//! - [`matcher`]: structural pattern matching with path-tagged discrepancies
//! - [`registry`]: one generic handler per call kind
//! - [`dispatch`]: replay of a single entry and the recorded error policy
//! - [`sequence`]: ordered replay of whole transcripts
//! - [`upgrade`]: re-checking recorded inputs against a new provider version
//!   before re-asserting its diffs
//! - [`provider`]: the [`ResourceProvider`] boundary plus mock implementations
//!
//! # Example
//!
//! ```ignore
//! use provider_replay_core::{check_upgrade_consistency, Transcript};
//!
//! let transcript = Transcript::from_file("recordings/bucket.jsonl")?;
//! let provider = MyProviderV2::new();
//! check_upgrade_consistency(transcript.entries(), &provider)?.into_result()?;
//! ```

#![allow(clippy::result_large_err)]

pub mod config;
pub mod dispatch;
pub mod matcher;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod sequence;
pub mod upgrade;

pub use config::ReplayConfig;
pub use dispatch::{replay_entry, replay_entry_with_config, EntryReport, Verdict};
pub use matcher::{assert_matches_pattern, match_pattern, Discrepancy};
pub use normalize::normalize_transcript;
pub use provider::{MockProvider, ResourceProvider, UnimplementedProvider};
pub use sequence::{
    replay_cases_parallel, replay_file, replay_json, replay_kinds, replay_sequence,
    replay_sequence_with_config, CaseReport, ReplayCase, SequenceReport,
};
pub use upgrade::{
    check_upgrade_consistency, check_upgrade_consistency_with_config, lint_causal_order,
    ConsistencyReport, ConsistencyStep, ResourceCallCache, StepOutcome,
};

// Transcript model, re-exported so callers need only this crate.
pub use provider_replay_types::{
    kinds, schema, CallKind, Entry, Expectation, ReplayError, SchemaPart, Transcript,
};
