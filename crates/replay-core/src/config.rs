//! Replay settings.
//!
//! Defaults suit test suites: keep going after failures, sort discrepancies
//! by path, report all of them. Each setting can be overridden from the
//! environment:
//!
//! | Variable                    | Field                          |
//! |-----------------------------|--------------------------------|
//! | `REPLAY_FAIL_FAST`          | `fail_fast`                    |
//! | `REPLAY_SORT_DISCREPANCIES` | `sort_discrepancies`           |
//! | `REPLAY_MAX_DISCREPANCIES`  | `max_discrepancies_per_entry`  |

use std::str::FromStr;

pub const ENV_FAIL_FAST: &str = "REPLAY_FAIL_FAST";
pub const ENV_SORT_DISCREPANCIES: &str = "REPLAY_SORT_DISCREPANCIES";
pub const ENV_MAX_DISCREPANCIES: &str = "REPLAY_MAX_DISCREPANCIES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Stop a walk at the first failing entry instead of reporting them all.
    pub fail_fast: bool,
    /// Order each entry's discrepancies by path.
    pub sort_discrepancies: bool,
    /// Cap on discrepancies kept per entry; `0` keeps everything.
    pub max_discrepancies_per_entry: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            sort_discrepancies: true,
            max_discrepancies_per_entry: 0,
        }
    }
}

impl ReplayConfig {
    /// Defaults, overridden by any `REPLAY_*` variables that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fail_fast: bool_or(lookup(ENV_FAIL_FAST), defaults.fail_fast),
            sort_discrepancies: bool_or(
                lookup(ENV_SORT_DISCREPANCIES),
                defaults.sort_discrepancies,
            ),
            max_discrepancies_per_entry: parse_or(
                lookup(ENV_MAX_DISCREPANCIES),
                defaults.max_discrepancies_per_entry,
            ),
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_max_discrepancies(mut self, max: usize) -> Self {
        self.max_discrepancies_per_entry = max;
        self
    }
}

/// Parse `raw` into `T`, falling back to `default` when unset or unparsable.
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Truthy values are "1", "true", "yes" and "on" (any case).
fn bool_or(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(v) => matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert!(!config.fail_fast);
        assert!(config.sort_discrepancies);
        assert_eq!(config.max_discrepancies_per_entry, 0);
    }

    #[test]
    fn test_value_helpers() {
        assert!(bool_or(Some("On".into()), false));
        assert!(!bool_or(Some("0".into()), true));
        assert!(bool_or(None, true));
        assert_eq!(parse_or(Some(" 12 ".into()), 3usize), 12);
        assert_eq!(parse_or(Some("twelve".into()), 3usize), 3);
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_FAIL_FAST, "yes"),
            (ENV_MAX_DISCREPANCIES, "4"),
        ]
        .into_iter()
        .collect();
        let config = ReplayConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert!(config.fail_fast);
        assert!(config.sort_discrepancies);
        assert_eq!(config.max_discrepancies_per_entry, 4);

        assert_eq!(ReplayConfig::from_lookup(|_| None), ReplayConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = ReplayConfig::default()
            .with_fail_fast(true)
            .with_max_discrepancies(5);
        assert!(config.fail_fast);
        assert_eq!(config.max_discrepancies_per_entry, 5);
    }
}
