//! Structural pattern matching over JSON values.
//!
//! A pattern is an ordinary JSON value with three extra rules:
//!
//! - the string `"*"` matches anything;
//! - an object with the single key `"\\"` matches its wrapped value exactly,
//!   with any `"*"` inside treated as data;
//! - an object key `"*"` is a catch-all applied to every key of the actual
//!   object that the pattern does not name. A pattern key starting with `\`
//!   has that marker stripped, so `"\\*"` names a literal `"*"` key.
//!
//! Matching never stops at the first mismatch: every discrepancy in the tree
//! is reported, each tagged with its path (`#`, `#["outputs"][2]`, ...).
//!
//! # Example
//!
//! ```
//! use provider_replay_core::matcher::match_pattern;
//! use serde_json::json;
//!
//! let pattern = json!({"id": "*", "tags": {"env": "prod", "*": "*"}});
//! let actual = json!({"id": "i-0a1b", "tags": {"env": "prod", "team": "core"}});
//! assert!(match_pattern(&pattern, &actual).is_empty());
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pattern string matching any value.
pub const WILDCARD: &str = "*";

/// Key marking an exact-match object, and prefix escaping literal keys.
pub const ESCAPE: &str = "\\";

/// Path of the root value.
pub const ROOT: &str = "#";

/// One path-localized mismatch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Discrepancy {
    pub path: String,
    pub message: String,
}

impl Discrepancy {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

/// Compare `actual` against `pattern`, returning every discrepancy found.
pub fn match_pattern(pattern: &Value, actual: &Value) -> Vec<Discrepancy> {
    let mut found = Vec::new();
    visit(ROOT, pattern, actual, &mut found);
    found
}

/// Order discrepancies by path for deterministic output.
pub fn sort_discrepancies(discrepancies: &mut [Discrepancy]) {
    discrepancies.sort();
}

/// Fail with every discrepancy listed if `actual` does not match `pattern`.
pub fn assert_matches_pattern(pattern: &Value, actual: &Value) -> anyhow::Result<()> {
    let mut found = match_pattern(pattern, actual);
    if found.is_empty() {
        return Ok(());
    }
    sort_discrepancies(&mut found);
    let lines: Vec<String> = found.iter().map(|d| d.to_string()).collect();
    anyhow::bail!(
        "value does not match pattern ({} discrepancies):\n  {}",
        found.len(),
        lines.join("\n  ")
    )
}

/// Deep equality ignoring object key order; numbers compare by value.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn visit(path: &str, pattern: &Value, actual: &Value, found: &mut Vec<Discrepancy>) {
    if pattern.as_str() == Some(WILDCARD) {
        return;
    }
    if let Some(exact) = pattern.as_object().and_then(escaped_value) {
        if !values_equal(exact, actual) {
            found.push(Discrepancy::new(
                path,
                format!("expected exactly {} but got {}", exact, actual),
            ));
        }
        return;
    }

    match pattern {
        Value::Array(expected) => match actual {
            Value::Array(got) if got.len() == expected.len() => {
                for (idx, (p, a)) in expected.iter().zip(got).enumerate() {
                    visit(&format!("{}[{}]", path, idx), p, a, found);
                }
            }
            Value::Array(got) => found.push(Discrepancy::new(
                path,
                format!(
                    "expected an array of length {} but got length {}",
                    expected.len(),
                    got.len()
                ),
            )),
            other => found.push(Discrepancy::new(
                path,
                format!("expected an array but got {}", other),
            )),
        },
        Value::Object(expected) => match actual {
            Value::Object(got) => visit_object(path, expected, got, found),
            other => found.push(Discrepancy::new(
                path,
                format!("expected an object but got {}", other),
            )),
        },
        _ => {
            if !values_equal(pattern, actual) {
                found.push(Discrepancy::new(
                    path,
                    format!("expected {} but got {}", pattern, actual),
                ));
            }
        }
    }
}

fn visit_object(
    path: &str,
    expected: &Map<String, Value>,
    got: &Map<String, Value>,
    found: &mut Vec<Discrepancy>,
) {
    let catch_all = expected.get(WILDCARD);
    let mut named = HashSet::new();

    for (raw_key, p) in expected {
        if raw_key == WILDCARD {
            continue;
        }
        let key = literal_key(raw_key);
        named.insert(key);
        let key_path = key_path(path, key);
        match got.get(key) {
            Some(a) => visit(&key_path, p, a, found),
            None => found.push(Discrepancy::new(key_path, "missing required value")),
        }
    }

    for (key, a) in got {
        if named.contains(key.as_str()) {
            continue;
        }
        let key_path = key_path(path, key);
        match catch_all {
            Some(p) => visit(&key_path, p, a, found),
            None => found.push(Discrepancy::new(
                key_path,
                format!("unexpected value {}", a),
            )),
        }
    }
}

fn escaped_value(map: &Map<String, Value>) -> Option<&Value> {
    if map.len() == 1 {
        map.get(ESCAPE)
    } else {
        None
    }
}

fn literal_key(raw: &str) -> &str {
    match raw.strip_prefix(ESCAPE) {
        Some(rest) if !rest.is_empty() => rest,
        _ => raw,
    }
}

fn key_path(path: &str, key: &str) -> String {
    format!("{}[{}]", path, Value::from(key))
}
