//! Errors raised while loading or dispatching transcript entries.
//!
//! Expectation violations (a response that does not match its pattern, a
//! missing or wrong error) are not errors: they are reported as verdicts.
//! The variants here mean the transcript or an entry could not be replayed
//! at all.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::call_kind::CallKind;

/// Which half of an exchange failed to fit its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPart {
    Request,
    Response,
}

impl fmt::Display for SchemaPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPart::Request => f.write_str("request"),
            SchemaPart::Response => f.write_str("response"),
        }
    }
}

/// Structured replay failures. `line` is the 1-based transcript position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayError {
    /// The transcript file could not be read or written.
    Io { path: PathBuf, message: String },

    /// Bad JSON, or an entry that is not shaped like a transcript entry.
    Malformed { line: usize, reason: String },

    /// `method` does not name a known endpoint.
    UnknownMethod { line: usize, method: String },

    /// The entry records neither a response nor any expected error.
    MissingExpectation { line: usize, method: CallKind },

    /// A request or response did not fit the endpoint's concrete shape.
    Schema {
        line: usize,
        method: CallKind,
        part: SchemaPart,
        reason: String,
    },

    /// A `Diff` for `urn` was reached with no earlier `Check` for it.
    MissingCheck { line: usize, urn: String },

    /// The new provider rejected a re-check of a recorded `Check` request.
    RecheckFailed {
        line: usize,
        urn: String,
        message: String,
    },

    /// Nothing to replay.
    EmptyTranscript,

    /// None of the requested kinds appear in the transcript.
    NoMatchingEntries { kinds: Vec<CallKind> },
}

impl ReplayError {
    /// The transcript line this error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ReplayError::Malformed { line, .. }
            | ReplayError::UnknownMethod { line, .. }
            | ReplayError::MissingExpectation { line, .. }
            | ReplayError::Schema { line, .. }
            | ReplayError::MissingCheck { line, .. }
            | ReplayError::RecheckFailed { line, .. } => Some(*line),
            ReplayError::Io { .. }
            | ReplayError::EmptyTranscript
            | ReplayError::NoMatchingEntries { .. } => None,
        }
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Io { path, message } => {
                write!(f, "transcript I/O failed for {}: {}", path.display(), message)
            }
            ReplayError::Malformed { line, reason } => {
                write!(f, "malformed transcript entry at line {}: {}", line, reason)
            }
            ReplayError::UnknownMethod { line, method } => {
                write!(f, "unknown method {:?} at line {}", method, line)
            }
            ReplayError::MissingExpectation { line, method } => write!(
                f,
                "{} entry at line {} has neither a response nor expected errors",
                method, line
            ),
            ReplayError::Schema {
                line,
                method,
                part,
                reason,
            } => write!(
                f,
                "{} {} at line {} does not match its schema: {}",
                method, part, line, reason
            ),
            ReplayError::MissingCheck { line, urn } => write!(
                f,
                "Diff at line {} for {} has no preceding Check for the same resource",
                line, urn
            ),
            ReplayError::RecheckFailed { line, urn, message } => write!(
                f,
                "re-running Check for {} (Diff at line {}) failed: {}",
                urn, line, message
            ),
            ReplayError::EmptyTranscript => f.write_str("transcript contains no entries"),
            ReplayError::NoMatchingEntries { kinds } => {
                let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
                write!(f, "transcript contains no {} entries", names.join("/"))
            }
        }
    }
}

impl std::error::Error for ReplayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_check_names_resource() {
        let err = ReplayError::MissingCheck {
            line: 7,
            urn: "urn:U2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("urn:U2"));
        assert!(msg.contains("line 7"));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_no_matching_entries_lists_kinds() {
        let err = ReplayError::NoMatchingEntries {
            kinds: vec![CallKind::Check, CallKind::Diff],
        };
        assert_eq!(err.to_string(), "transcript contains no Check/Diff entries");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let err = ReplayError::UnknownMethod {
            line: 2,
            method: "/x/Y".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "unknown_method");
        assert_eq!(json["line"], 2);
    }
}
