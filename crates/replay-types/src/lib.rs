//! Shared types for the provider-replay workspace.
//!
//! This crate holds the transcript model that the replay engine consumes:
//!
//! - [`CallKind`](call_kind::CallKind) - the closed set of provider endpoints
//! - [`schema`] - concrete request/response shapes per endpoint, bound to
//!   their kind through [`CallSchema`](schema::CallSchema)
//! - [`Transcript`](transcript::Transcript) / [`Entry`](transcript::Entry) -
//!   recorded calls, loaded from JSON arrays or newline-delimited JSON
//! - [`Projection`](projection::Projection) - typed per-kind views with
//!   lookup by resource URN
//! - [`ReplayError`](error::ReplayError) - load and dispatch failures

pub mod call_kind;
pub mod error;
pub mod projection;
pub mod schema;
pub mod transcript;

// Re-export commonly used types at crate root
pub use call_kind::CallKind;
pub use error::{ReplayError, SchemaPart};
pub use projection::{Exchange, Projection};
pub use schema::{kinds, CallSchema, PropertyMap, ResourceKeyed};
pub use transcript::{Entry, Expectation, Transcript, ANY_ERROR};
