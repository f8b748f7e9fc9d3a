//! Transcript loading and writing.
//!
//! A transcript is a flat log of recorded provider calls, stored either as a
//! JSON array of entry objects or as newline-delimited JSON (one entry per
//! line). Each entry looks like:
//!
//! ```text
//! {"method": "/provider.ResourceProvider/Check",
//!  "request": {...},
//!  "response": {...},          // when the call succeeded
//!  "errors": ["message"]}      // when the call failed; "*" matches any message
//! ```
//!
//! Loading validates every entry up front: bad JSON, unknown methods and
//! entries without any expectation fail the whole load before anything is
//! replayed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::call_kind::CallKind;
use crate::error::ReplayError;
use crate::projection::Projection;
use crate::schema::CallSchema;

/// Error message that matches any error.
pub const ANY_ERROR: &str = "*";

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// 1-based position in the source (line for JSONL, element for arrays).
    pub line: usize,
    pub method: CallKind,
    pub request: Value,
    pub response: Option<Value>,
    pub errors: Vec<String>,
}

/// What replaying an entry is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation<'a> {
    /// The call succeeds and its response matches this pattern.
    Response(&'a Value),
    /// The call fails with any message.
    AnyError,
    /// The call fails with exactly this message.
    Error(&'a str),
    /// The call fails with one of these messages.
    ///
    /// Legacy form from recorders that captured several errors per call.
    OneOfErrors(&'a [String]),
}

impl Entry {
    /// Build an entry that expects a successful response.
    pub fn with_response(method: CallKind, request: Value, response: Value) -> Self {
        Self {
            line: 0,
            method,
            request,
            response: Some(response),
            errors: Vec::new(),
        }
    }

    /// Build an entry that expects the call to fail.
    pub fn with_errors(method: CallKind, request: Value, errors: Vec<String>) -> Self {
        Self {
            line: 0,
            method,
            request,
            response: None,
            errors,
        }
    }

    /// Resource URN carried by the request, if the endpoint has one.
    pub fn urn(&self) -> Option<&str> {
        self.request.get("urn").and_then(Value::as_str)
    }

    /// Interpret the recorded response/errors.
    ///
    /// Returns `None` when the entry carries no expectation at all.
    pub fn expectation(&self) -> Option<Expectation<'_>> {
        match self.errors.as_slice() {
            [] => self.response.as_ref().map(Expectation::Response),
            [only] if only == ANY_ERROR => Some(Expectation::AnyError),
            [only] => Some(Expectation::Error(only)),
            many => Some(Expectation::OneOfErrors(many)),
        }
    }

    fn from_value(line: usize, value: Value) -> Result<Self, ReplayError> {
        let Value::Object(mut fields) = value else {
            return Err(ReplayError::Malformed {
                line,
                reason: "entry is not a JSON object".into(),
            });
        };

        let method = match fields.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => {
                return Err(ReplayError::Malformed {
                    line,
                    reason: "\"method\" is not a string".into(),
                })
            }
            None => {
                return Err(ReplayError::Malformed {
                    line,
                    reason: "missing \"method\"".into(),
                })
            }
        };
        let method = CallKind::from_method(&method)
            .ok_or(ReplayError::UnknownMethod { line, method })?;

        let request = match fields.remove("request") {
            Some(request @ Value::Object(_)) => request,
            Some(_) => {
                return Err(ReplayError::Malformed {
                    line,
                    reason: "\"request\" is not an object".into(),
                })
            }
            None => {
                return Err(ReplayError::Malformed {
                    line,
                    reason: "missing \"request\"".into(),
                })
            }
        };

        let response = match fields.remove("response") {
            None | Some(Value::Null) => None,
            Some(response) => Some(response),
        };

        let errors = match fields.remove("errors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(message) => Ok(message),
                    other => Err(ReplayError::Malformed {
                        line,
                        reason: format!("expected error message string, got {}", other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ReplayError::Malformed {
                    line,
                    reason: "\"errors\" is not an array".into(),
                })
            }
        };

        let entry = Entry {
            line,
            method,
            request,
            response,
            errors,
        };
        if entry.expectation().is_none() {
            return Err(ReplayError::MissingExpectation { line, method });
        }
        Ok(entry)
    }
}

#[derive(Serialize)]
struct WireEntry<'a> {
    method: CallKind,
    request: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: &'a Vec<String>,
}

impl Serialize for Entry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEntry {
            method: self.method,
            request: &self.request,
            response: self.response.as_ref(),
            errors: &self.errors,
        }
        .serialize(serializer)
    }
}

/// An ordered, read-only sequence of recorded calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Wrap already-built entries. Entries with `line == 0` are numbered by
    /// position.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(idx, mut entry)| {
                if entry.line == 0 {
                    entry.line = idx + 1;
                }
                entry
            })
            .collect();
        Self { entries }
    }

    /// Parse a transcript from either a JSON array or newline-delimited JSON.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let trimmed = text.trim_start();
        let entries = if trimmed.starts_with('[') {
            let items: Vec<Value> =
                serde_json::from_str(trimmed).map_err(|e| ReplayError::Malformed {
                    line: e.line(),
                    reason: e.to_string(),
                })?;
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| Entry::from_value(idx + 1, item))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut entries = Vec::new();
            for (idx, raw) in text.lines().enumerate() {
                let line = idx + 1;
                if raw.trim().is_empty() {
                    continue;
                }
                let value: Value =
                    serde_json::from_str(raw).map_err(|e| ReplayError::Malformed {
                        line,
                        reason: e.to_string(),
                    })?;
                entries.push(Entry::from_value(line, value)?);
            }
            entries
        };
        Ok(Self { entries })
    }

    /// Read and parse a transcript file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ReplayError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, in transcript order.
    pub fn of_kind(&self, kind: CallKind) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |entry| entry.method == kind)
    }

    /// A derived transcript holding only entries of the given kinds.
    pub fn filter_kinds(&self, kinds: &[CallKind]) -> Transcript {
        Transcript {
            entries: self
                .entries
                .iter()
                .filter(|entry| kinds.contains(&entry.method))
                .cloned()
                .collect(),
        }
    }

    /// Number of entries per kind.
    pub fn count_by_kind(&self) -> BTreeMap<CallKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.method).or_insert(0) += 1;
        }
        counts
    }

    /// Decode every entry of kind `K` into its concrete schema.
    pub fn projection<K: CallSchema>(&self) -> Result<Projection<K>, ReplayError> {
        Projection::from_entries(&self.entries)
    }

    /// Render as newline-delimited JSON.
    pub fn to_jsonl(&self) -> Result<String, ReplayError> {
        let mut out = String::new();
        for entry in &self.entries {
            let line = serde_json::to_string(entry).map_err(|e| ReplayError::Malformed {
                line: entry.line,
                reason: e.to_string(),
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Write as newline-delimited JSON.
    pub fn write_jsonl(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        let text = self.to_jsonl()?;
        fs::write(path, text).map_err(|e| ReplayError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
