//! Custom assertion utilities for tests.

use provider_replay::{EntryReport, SequenceReport};

/// Assert that a result is Ok and return the inner value.
///
/// Provides a better error message than `.unwrap()` by including context.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that a result is Err and return the error.
#[allow(dead_code)]
pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>, context: &str) -> E {
    match result {
        Ok(v) => panic!("{} should have failed but got: {:?}", context, v),
        Err(e) => e,
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that every entry of a sequence passed, listing failures otherwise.
#[allow(dead_code)]
pub fn assert_all_passed(report: &SequenceReport, context: &str) {
    assert!(report.passed(), "{}: {}", context, report);
}

/// Assert that an entry report has a discrepancy at exactly `path`.
#[allow(dead_code)]
pub fn assert_has_discrepancy_at(report: &EntryReport, path: &str) {
    let paths: Vec<&str> = report
        .discrepancies()
        .iter()
        .map(|d| d.path.as_str())
        .collect();
    assert!(
        paths.contains(&path),
        "expected a discrepancy at {}, found {:?}",
        path,
        paths
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_ok() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok(result, "test operation"), 42);
    }

    #[test]
    #[should_panic(expected = "test operation failed")]
    fn test_assert_ok_fails() {
        let result: Result<i32, &str> = Err("error");
        assert_ok(result, "test operation");
    }

    #[test]
    fn test_assert_err() {
        let result: Result<i32, &str> = Err("error");
        assert_eq!(assert_err(result, "test operation"), "error");
    }

    #[test]
    fn test_assert_error_contains() {
        assert_error_contains("Diff at line 3 has no Check", "no check", "lint");
    }
}
