//! Ordered replay of whole transcripts.
//!
//! Entries are replayed strictly in recorded order against one provider, so
//! a call that depends on state created by an earlier call sees it. Empty
//! input is an error rather than a vacuous pass: a transcript that records
//! nothing usually means the recorder was misconfigured.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use provider_replay_types::{CallKind, Entry, ReplayError, Transcript};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReplayConfig;
use crate::dispatch::{replay_entry_with_config, EntryReport};
use crate::provider::ResourceProvider;

/// Results of replaying a sequence of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceReport {
    pub entries: Vec<EntryReport>,
    /// Set when `fail_fast` cut the sequence short.
    pub stopped_early: bool,
}

impl SequenceReport {
    pub fn passed(&self) -> bool {
        self.entries.iter().all(EntryReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|report| !report.passed())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// `Ok` when every entry passed, otherwise an error listing each failure.
    pub fn into_result(self) -> Result<()> {
        if self.passed() {
            return Ok(());
        }
        anyhow::bail!("{}", self)
    }
}

impl fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failure_count();
        write!(
            f,
            "replayed {} entries: {} passed, {} failed",
            self.entries.len(),
            self.entries.len() - failed,
            failed
        )?;
        if self.stopped_early {
            f.write_str(" (stopped at first failure)")?;
        }
        for report in self.failures() {
            write!(f, "\n  {}", report)?;
        }
        Ok(())
    }
}

/// Replay every entry in order.
pub fn replay_sequence(
    entries: &[Entry],
    provider: &dyn ResourceProvider,
) -> Result<SequenceReport, ReplayError> {
    replay_sequence_with_config(entries, provider, &ReplayConfig::default())
}

pub fn replay_sequence_with_config(
    entries: &[Entry],
    provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> Result<SequenceReport, ReplayError> {
    if entries.is_empty() {
        return Err(ReplayError::EmptyTranscript);
    }
    Ok(walk(entries.iter(), provider, config))
}

/// Replay, in order, only the entries of the given kinds.
///
/// Fails if none of the kinds appear.
pub fn replay_kinds(
    entries: &[Entry],
    kinds: &[CallKind],
    provider: &dyn ResourceProvider,
) -> Result<SequenceReport, ReplayError> {
    replay_kinds_with_config(entries, kinds, provider, &ReplayConfig::default())
}

pub fn replay_kinds_with_config(
    entries: &[Entry],
    kinds: &[CallKind],
    provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> Result<SequenceReport, ReplayError> {
    let selected: Vec<&Entry> = entries
        .iter()
        .filter(|entry| kinds.contains(&entry.method))
        .collect();
    if selected.is_empty() {
        return Err(ReplayError::NoMatchingEntries {
            kinds: kinds.to_vec(),
        });
    }
    Ok(walk(selected.into_iter(), provider, config))
}

fn walk<'a>(
    entries: impl Iterator<Item = &'a Entry>,
    provider: &dyn ResourceProvider,
    config: &ReplayConfig,
) -> SequenceReport {
    let mut reports = Vec::new();
    let mut stopped_early = false;
    let mut entries = entries.peekable();

    while let Some(entry) = entries.next() {
        let report = replay_entry_with_config(entry, provider, config);
        let failed = !report.passed();
        reports.push(report);
        if failed && config.fail_fast {
            stopped_early = entries.peek().is_some();
            if stopped_early {
                warn!(line = entry.line, "stopping replay at first failure");
            }
            break;
        }
    }

    let report = SequenceReport {
        entries: reports,
        stopped_early,
    };
    info!(
        provider = provider.name(),
        total = report.entries.len(),
        failed = report.failure_count(),
        "sequence replay finished"
    );
    report
}

/// Load a transcript file and replay all of it.
pub fn replay_file(path: impl AsRef<Path>, provider: &dyn ResourceProvider) -> Result<SequenceReport> {
    let path = path.as_ref();
    let transcript = Transcript::from_file(path)?;
    replay_sequence_with_config(transcript.entries(), provider, &ReplayConfig::from_env())
        .with_context(|| format!("replaying {}", path.display()))
}

/// Replay a single entry given as JSON text.
pub fn replay_json(provider: &dyn ResourceProvider, entry_json: &str) -> Result<EntryReport, ReplayError> {
    let transcript = Transcript::parse(entry_json)?;
    match transcript.entries() {
        [entry] => Ok(replay_entry_with_config(entry, provider, &ReplayConfig::default())),
        [] => Err(ReplayError::EmptyTranscript),
        [_, second, ..] => Err(ReplayError::Malformed {
            line: second.line,
            reason: "expected a single entry".into(),
        }),
    }
}

/// An independent transcript paired with its own provider instance.
pub struct ReplayCase<P> {
    pub name: String,
    pub transcript: Transcript,
    pub provider: P,
}

/// Outcome of one [`ReplayCase`].
#[derive(Debug)]
pub struct CaseReport {
    pub name: String,
    pub result: Result<SequenceReport, ReplayError>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.passed())
    }
}

/// Replay independent cases in parallel; each case stays sequential.
///
/// Reports come back in input order.
pub fn replay_cases_parallel<P: ResourceProvider>(
    cases: Vec<ReplayCase<P>>,
    config: &ReplayConfig,
) -> Vec<CaseReport> {
    cases
        .into_par_iter()
        .map(|case| CaseReport {
            result: replay_sequence_with_config(case.transcript.entries(), &case.provider, config),
            name: case.name,
        })
        .collect()
}
