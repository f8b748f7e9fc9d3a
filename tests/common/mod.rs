#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: Transcript fixtures written to temporary files
//! - `providers`: Small in-memory providers to replay against
//! - `assertions`: Assertion helpers with better failure messages

pub mod assertions;
pub mod fixtures;
pub mod providers;

pub use fixtures::{write_transcript, TranscriptFixture, LIFECYCLE_JSONL, UPGRADE_JSON};
pub use providers::CounterProvider;

pub use assertions::{
    assert_all_passed, assert_err, assert_error_contains, assert_has_discrepancy_at, assert_ok,
};
