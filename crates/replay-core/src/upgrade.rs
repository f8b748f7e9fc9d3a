//! Upgrade consistency checking.
//!
//! A transcript recorded against the old provider version is walked in order
//! against a new version. Each `Check` request is cached by resource URN.
//! On each `Diff`, the new provider re-checks the cached request, its
//! normalized inputs replace the recorded `news`, and the rewritten diff is
//! replayed against the recorded diff expectation. Nothing else in the
//! transcript is replayed, so no side-effecting call runs.
//!
//! A `Diff` whose resource has no earlier `Check` is a fault for that
//! resource, never a skip.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use anyhow::Result;
use provider_replay_types::schema::{CheckRequest, DiffRequest};
use provider_replay_types::{CallKind, Entry, ReplayError, SchemaPart};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ReplayConfig;
use crate::dispatch::{replay_entry_with_config, EntryReport};
use crate::provider::ResourceProvider;

/// Latest `Check` request per resource URN, local to one walk.
#[derive(Debug, Default)]
pub struct ResourceCallCache {
    checks: HashMap<String, CheckRequest>,
}

impl ResourceCallCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `request` as the latest check for its URN.
    pub fn record(&mut self, request: CheckRequest) {
        if let Some(previous) = self.checks.insert(request.urn.clone(), request) {
            debug!(urn = %previous.urn, "replacing cached check request");
        }
    }

    pub fn latest_for(&self, urn: &str) -> Option<&CheckRequest> {
        self.checks.get(urn)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The rewritten diff was replayed.
    Replayed { report: EntryReport },
    /// The step could not be carried out.
    Fault { error: ReplayError },
}

/// One step of the walk that concerns a single resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyStep {
    pub urn: String,
    pub line: usize,
    pub method: CallKind,
    pub outcome: StepOutcome,
}

impl ConsistencyStep {
    pub fn passed(&self) -> bool {
        match &self.outcome {
            StepOutcome::Replayed { report } => report.passed(),
            StepOutcome::Fault { .. } => false,
        }
    }
}

impl fmt::Display for ConsistencyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Replayed { report } => write!(f, "{}: {}", self.urn, report),
            StepOutcome::Fault { error } => write!(f, "{}: {}", self.urn, error),
        }
    }
}

/// Everything one consistency walk found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub steps: Vec<ConsistencyStep>,
}

impl ConsistencyReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(ConsistencyStep::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConsistencyStep> {
        self.steps.iter().filter(|step| !step.passed())
    }

    /// Pass/fail per resource; a resource fails if any of its steps did.
    pub fn resources(&self) -> BTreeMap<String, bool> {
        let mut verdicts = BTreeMap::new();
        for step in &self.steps {
            let ok = verdicts.entry(step.urn.clone()).or_insert(true);
            *ok &= step.passed();
        }
        verdicts
    }

    pub fn into_result(self) -> Result<()> {
        if self.passed() {
            return Ok(());
        }
        anyhow::bail!("{}", self)
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resources = self.resources();
        let failed = resources.values().filter(|ok| !**ok).count();
        write!(
            f,
            "upgrade consistency: {} resources checked, {} failed",
            resources.len(),
            failed
        )?;
        for step in self.failures() {
            write!(f, "\n  {}", step)?;
        }
        Ok(())
    }
}

/// Check that `new_provider` computes the recorded diffs from re-checked inputs.
pub fn check_upgrade_consistency(
    entries: &[Entry],
    new_provider: &dyn ResourceProvider,
) -> Result<ConsistencyReport, ReplayError> {
    check_upgrade_consistency_with_config(entries, new_provider, &ReplayConfig::default())
}

pub fn check_upgrade_consistency_with_config(
    entries: &[Entry],
    new_provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> Result<ConsistencyReport, ReplayError> {
    if entries.is_empty() {
        return Err(ReplayError::EmptyTranscript);
    }
    if !entries.iter().any(|entry| entry.method == CallKind::Diff) {
        return Err(ReplayError::NoMatchingEntries {
            kinds: vec![CallKind::Diff],
        });
    }

    let mut cache = ResourceCallCache::new();
    let mut steps = Vec::new();

    for entry in entries {
        let step = match entry.method {
            CallKind::Check => match decode_request::<CheckRequest>(entry) {
                Ok(request) => {
                    cache.record(request);
                    continue;
                }
                Err(error) => fault_step(entry, error),
            },
            CallKind::Diff => diff_step(entry, &cache, new_provider, config),
            _ => continue,
        };

        let failed = !step.passed();
        if failed {
            warn!(urn = %step.urn, line = step.line, "upgrade consistency failure");
        }
        steps.push(step);
        if failed && config.fail_fast {
            break;
        }
    }

    let report = ConsistencyReport { steps };
    info!(
        provider = new_provider.name(),
        cached = cache.len(),
        steps = report.steps.len(),
        passed = report.passed(),
        "upgrade consistency walk finished"
    );
    Ok(report)
}

fn diff_step(
    entry: &Entry,
    cache: &ResourceCallCache,
    new_provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> ConsistencyStep {
    match rederive_diff(entry, cache, new_provider) {
        Ok(rewritten) => ConsistencyStep {
            urn: entry.urn().unwrap_or_default().to_string(),
            line: entry.line,
            method: entry.method,
            outcome: StepOutcome::Replayed {
                report: replay_entry_with_config(&rewritten, new_provider, config),
            },
        },
        Err(error) => fault_step(entry, error),
    }
}

/// The recorded diff entry with `news` replaced by the new provider's
/// re-checked inputs.
fn rederive_diff(
    entry: &Entry,
    cache: &ResourceCallCache,
    new_provider: &dyn ResourceProvider,
) -> Result<Entry, ReplayError> {
    let diff: DiffRequest = decode_request(entry)?;
    let cached = cache
        .latest_for(&diff.urn)
        .ok_or_else(|| ReplayError::MissingCheck {
            line: entry.line,
            urn: diff.urn.clone(),
        })?;

    let rechecked =
        new_provider
            .check(cached.clone())
            .map_err(|err| ReplayError::RecheckFailed {
                line: entry.line,
                urn: diff.urn.clone(),
                message: err.to_string(),
            })?;
    if !rechecked.failures.is_empty() {
        debug!(
            urn = %diff.urn,
            count = rechecked.failures.len(),
            "re-check reported failures"
        );
    }

    let mut rewritten = entry.clone();
    if let Value::Object(request) = &mut rewritten.request {
        match rechecked.inputs {
            Some(inputs) => {
                request.insert("news".to_string(), Value::Object(inputs));
            }
            None => {
                request.remove("news");
            }
        }
    }
    Ok(rewritten)
}

fn decode_request<T: DeserializeOwned>(entry: &Entry) -> Result<T, ReplayError> {
    serde_json::from_value(entry.request.clone()).map_err(|e| ReplayError::Schema {
        line: entry.line,
        method: entry.method,
        part: SchemaPart::Request,
        reason: e.to_string(),
    })
}

fn fault_step(entry: &Entry, error: ReplayError) -> ConsistencyStep {
    ConsistencyStep {
        urn: entry.urn().unwrap_or_default().to_string(),
        line: entry.line,
        method: entry.method,
        outcome: StepOutcome::Fault { error },
    }
}

/// Every `Diff` whose resource has no earlier `Check`.
///
/// Runs without a provider, so a transcript can be vetted before any walk.
pub fn lint_causal_order(entries: &[Entry]) -> Vec<ReplayError> {
    let mut checked = HashSet::new();
    let mut problems = Vec::new();
    for entry in entries {
        let urn = entry.urn().unwrap_or_default();
        match entry.method {
            CallKind::Check => {
                checked.insert(urn);
            }
            CallKind::Diff if !checked.contains(urn) => problems.push(ReplayError::MissingCheck {
                line: entry.line,
                urn: urn.to_string(),
            }),
            _ => {}
        }
    }
    problems
}
