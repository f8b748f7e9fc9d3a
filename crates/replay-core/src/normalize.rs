//! Canonicalization of nondeterministic response shapes.
//!
//! Providers may report validation failures in any order. Live responses
//! always have their `failures` list stably sorted by `(property, reason)`
//! before comparison. Recorded patterns get the same treatment only when
//! every element is literal data; a pattern list containing wildcards is
//! positional and is left exactly as recorded.

use std::cmp::Ordering;

use provider_replay_types::schema::CheckFailure;
use provider_replay_types::{CallKind, Transcript};
use serde_json::Value;
use tracing::trace;

use crate::matcher::{ESCAPE, WILDCARD};

/// Response field holding validation failures.
pub const FAILURES_FIELD: &str = "failures";

/// Endpoints whose responses carry a `failures` list.
pub fn has_failure_list(kind: CallKind) -> bool {
    matches!(
        kind,
        CallKind::Check | CallKind::CheckConfig | CallKind::Invoke | CallKind::Call
    )
}

/// Stable sort by `(property, reason)`.
pub fn sort_failures(failures: &mut [CheckFailure]) {
    failures.sort_by(|a, b| {
        a.property
            .cmp(&b.property)
            .then_with(|| a.reason.cmp(&b.reason))
    });
}

/// Sort a recorded response's `failures` list if it is literal data.
///
/// Returns whether the list was reordered.
pub fn normalize_recorded_failures(response: &mut Value) -> bool {
    let Some(Value::Array(items)) = response.get_mut(FAILURES_FIELD) else {
        return false;
    };
    if !items.iter().all(is_literal_failure) {
        trace!("recorded failure list contains wildcards; keeping recorded order");
        return false;
    }
    let before = items.clone();
    items.sort_by(compare_failure_values);
    *items != before
}

/// A copy of `transcript` with every literal recorded failure list sorted.
pub fn normalize_transcript(transcript: &Transcript) -> Transcript {
    let entries = transcript
        .iter()
        .cloned()
        .map(|mut entry| {
            if has_failure_list(entry.method) {
                if let Some(response) = entry.response.as_mut() {
                    normalize_recorded_failures(response);
                }
            }
            entry
        })
        .collect();
    Transcript::from_entries(entries)
}

fn is_literal_failure(item: &Value) -> bool {
    let Value::Object(fields) = item else {
        return false;
    };
    if fields.contains_key(WILDCARD) || fields.contains_key(ESCAPE) {
        return false;
    }
    ["property", "reason"]
        .iter()
        .all(|key| match fields.get(*key) {
            None => true,
            Some(Value::String(s)) => s != WILDCARD,
            Some(_) => false,
        })
}

fn str_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}

fn failure_key(item: &Value) -> (&str, &str) {
    (str_field(item, "property"), str_field(item, "reason"))
}

fn compare_failure_values(a: &Value, b: &Value) -> Ordering {
    failure_key(a).cmp(&failure_key(b))
}
