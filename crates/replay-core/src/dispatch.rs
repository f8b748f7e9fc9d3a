//! Replay of a single transcript entry.
//!
//! ```text
//! Entry → Handler (decode → invoke → normalize → encode) → judge → EntryReport
//! ```
//!
//! Judging applies the recorded error policy first:
//!
//! | recorded `errors`   | the live call must...                          |
//! |---------------------|------------------------------------------------|
//! | absent / empty      | succeed, and its response must match `response`|
//! | `["*"]`             | fail, with any message                         |
//! | `["msg"]`           | fail, with exactly `msg`                       |
//! | `["m1", "m2", ...]` | fail, with one of the listed messages (legacy) |

use std::borrow::Cow;
use std::fmt;

use provider_replay_types::{CallKind, Entry, Expectation, ReplayError};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ReplayConfig;
use crate::matcher::{match_pattern, sort_discrepancies, Discrepancy, ROOT};
use crate::normalize::{has_failure_list, normalize_recorded_failures};
use crate::provider::ResourceProvider;
use crate::registry::{self, Invocation};

/// How a replayed entry compared with its recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    /// The response differed from the recorded pattern.
    Mismatch { discrepancies: Vec<Discrepancy> },
    /// The call failed but a response was recorded.
    UnexpectedError { message: String },
    /// The call succeeded but an error was recorded.
    MissingError { expected: Vec<String>, response: Value },
    /// The call failed with a message other than the recorded one(s).
    WrongError { expected: Vec<String>, actual: String },
    /// The entry could not be replayed at all.
    Fault { error: ReplayError },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    /// Structural discrepancies; empty unless this is a mismatch.
    pub fn discrepancies(&self) -> &[Discrepancy] {
        match self {
            Verdict::Mismatch { discrepancies } => discrepancies,
            _ => &[],
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => f.write_str("passed"),
            Verdict::Mismatch { discrepancies } => {
                write!(f, "response mismatch ({} discrepancies)", discrepancies.len())?;
                for d in discrepancies {
                    write!(f, "\n    {}", d)?;
                }
                Ok(())
            }
            Verdict::UnexpectedError { message } => {
                write!(f, "expected success but the call failed: {}", message)
            }
            Verdict::MissingError { expected, response } => write!(
                f,
                "expected an error ({}) but the call succeeded with {}",
                expected.join(" | "),
                response
            ),
            Verdict::WrongError { expected, actual } => write!(
                f,
                "expected error {} but got {:?}",
                expected
                    .iter()
                    .map(|e| format!("{:?}", e))
                    .collect::<Vec<_>>()
                    .join(" or "),
                actual
            ),
            Verdict::Fault { error } => write!(f, "could not replay: {}", error),
        }
    }
}

/// The result of replaying one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryReport {
    pub line: usize,
    pub method: CallKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    pub verdict: Verdict,
}

impl EntryReport {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        self.verdict.discrepancies()
    }
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}", self.method, self.line)?;
        if let Some(urn) = &self.urn {
            write!(f, ", {}", urn)?;
        }
        write!(f, "): {}", self.verdict)
    }
}

/// Replay `entry` against `provider` with default settings.
pub fn replay_entry(entry: &Entry, provider: &dyn ResourceProvider) -> EntryReport {
    replay_entry_with_config(entry, provider, &ReplayConfig::default())
}

pub fn replay_entry_with_config(
    entry: &Entry,
    provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> EntryReport {
    debug!(
        method = %entry.method,
        line = entry.line,
        provider = provider.name(),
        "replaying entry"
    );

    let verdict = match registry::handler(entry.method).run(provider, &entry.request, entry.line) {
        Ok(invocation) => judge(entry, invocation, config),
        Err(error) => Verdict::Fault { error },
    };

    let report = EntryReport {
        line: entry.line,
        method: entry.method,
        urn: entry.urn().map(str::to_string),
        verdict,
    };
    if !report.passed() {
        warn!(method = %report.method, line = report.line, "replay failed: {}", report.verdict);
    }
    report
}

fn judge(entry: &Entry, invocation: Invocation, config: &ReplayConfig) -> Verdict {
    let Some(expectation) = entry.expectation() else {
        return Verdict::Fault {
            error: ReplayError::MissingExpectation {
                line: entry.line,
                method: entry.method,
            },
        };
    };

    match (expectation, invocation) {
        (Expectation::Response(pattern), Invocation::Responded(actual)) => {
            let pattern = recorded_pattern(entry.method, pattern);
            let found = match_pattern(&pattern, &actual);
            finish_match(found, config)
        }
        (Expectation::Response(_), Invocation::Failed(message)) => {
            Verdict::UnexpectedError { message }
        }
        (Expectation::AnyError, Invocation::Failed(_)) => Verdict::Passed,
        (Expectation::Error(expected), Invocation::Failed(actual)) => {
            if actual == expected {
                Verdict::Passed
            } else {
                Verdict::WrongError {
                    expected: vec![expected.to_string()],
                    actual,
                }
            }
        }
        (Expectation::OneOfErrors(expected), Invocation::Failed(actual)) => {
            if expected.contains(&actual) {
                Verdict::Passed
            } else {
                Verdict::WrongError {
                    expected: expected.to_vec(),
                    actual,
                }
            }
        }
        (_, Invocation::Responded(response)) => Verdict::MissingError {
            expected: entry.errors.clone(),
            response,
        },
    }
}

fn recorded_pattern(method: CallKind, pattern: &Value) -> Cow<'_, Value> {
    if !has_failure_list(method) {
        return Cow::Borrowed(pattern);
    }
    let mut owned = pattern.clone();
    normalize_recorded_failures(&mut owned);
    Cow::Owned(owned)
}

fn finish_match(mut found: Vec<Discrepancy>, config: &ReplayConfig) -> Verdict {
    if found.is_empty() {
        return Verdict::Passed;
    }
    if config.sort_discrepancies {
        sort_discrepancies(&mut found);
    }
    let max = config.max_discrepancies_per_entry;
    if max > 0 && found.len() > max {
        let omitted = found.len() - max;
        found.truncate(max);
        found.push(Discrepancy::new(
            ROOT,
            format!("{} more discrepancies omitted", omitted),
        ));
    }
    Verdict::Mismatch {
        discrepancies: found,
    }
}
