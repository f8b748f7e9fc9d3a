//! Offline transcript checker.
//!
//! Loads a transcript, reports how many entries of each kind it holds and
//! lints it for problems that would make a replay fail before any provider
//! is involved: entries that do not fit their endpoint's schema and `Diff`
//! calls with no earlier `Check` for the same resource. Optionally writes a
//! normalized copy with literal failure lists sorted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;

use provider_replay::schema::{CheckRequest, DiffRequest};
use provider_replay::{
    lint_causal_order, normalize_transcript, CallKind, ReplayError, SchemaPart, Transcript,
};

#[derive(Parser, Debug)]
#[command(name = "transcript-check", author, version, about)]
struct Args {
    /// Transcript file (JSON array or newline-delimited JSON)
    #[arg(value_name = "PATH")]
    transcript: PathBuf,

    /// Only consider these call kinds (e.g. `Check`, `Diff`). Repeatable.
    #[arg(long = "kind", value_name = "KIND")]
    kinds: Vec<CallKind>,

    /// Print the summary as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write a normalized copy of the transcript as JSONL
    #[arg(long, value_name = "PATH")]
    normalize: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    path: PathBuf,
    entries: usize,
    counts: BTreeMap<String, usize>,
    problems: Vec<ReplayError>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let full = Transcript::from_file(&args.transcript)?;
    // Ordering is linted on the whole file so a filtered-out Check still
    // counts as preceding its Diff.
    let (transcript, problems) = if args.kinds.is_empty() {
        let problems = lint(&full);
        (full, problems)
    } else {
        let filtered = full.filter_kinds(&args.kinds);
        let problems = if filtered.is_empty() {
            vec![ReplayError::EmptyTranscript]
        } else {
            only_kinds(lint(&full), &full, &args.kinds)
        };
        (filtered, problems)
    };

    let summary = Summary {
        path: args.transcript.clone(),
        entries: transcript.len(),
        counts: transcript
            .count_by_kind()
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect(),
        problems,
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    if let Some(out) = &args.normalize {
        normalize_transcript(&transcript)
            .write_jsonl(out)
            .with_context(|| format!("write normalized transcript to {}", out.display()))?;
        if !args.json {
            println!("Normalized transcript written to {}", out.display());
        }
    }

    if !summary.problems.is_empty() {
        anyhow::bail!(
            "{} problem(s) found in {}",
            summary.problems.len(),
            args.transcript.display()
        );
    }
    Ok(())
}

fn lint(transcript: &Transcript) -> Vec<ReplayError> {
    let mut problems = Vec::new();
    if transcript.is_empty() {
        problems.push(ReplayError::EmptyTranscript);
        return problems;
    }
    // Responses are patterns and may not fit their typed shape; only
    // requests are decoded.
    problems.extend(request_problems::<CheckRequest>(transcript, CallKind::Check));
    problems.extend(request_problems::<DiffRequest>(transcript, CallKind::Diff));
    problems.extend(lint_causal_order(transcript.entries()));
    problems.sort_by_key(|p| p.line());
    problems
}

/// Keep problems raised by entries of the selected kinds.
fn only_kinds(problems: Vec<ReplayError>, full: &Transcript, kinds: &[CallKind]) -> Vec<ReplayError> {
    let kind_at: BTreeMap<usize, CallKind> =
        full.entries().iter().map(|e| (e.line, e.method)).collect();
    problems
        .into_iter()
        .filter(|p| match p.line() {
            Some(line) => kind_at.get(&line).is_some_and(|k| kinds.contains(k)),
            None => true,
        })
        .collect()
}

fn request_problems<T: DeserializeOwned>(transcript: &Transcript, kind: CallKind) -> Vec<ReplayError> {
    transcript
        .of_kind(kind)
        .filter_map(|entry| {
            serde_json::from_value::<T>(entry.request.clone())
                .err()
                .map(|e| ReplayError::Schema {
                    line: entry.line,
                    method: kind,
                    part: SchemaPart::Request,
                    reason: e.to_string(),
                })
        })
        .collect()
}

fn print_summary(summary: &Summary) {
    println!("Transcript: {}", summary.path.display());
    println!("Entries:    {}", summary.entries);
    for (kind, count) in &summary.counts {
        println!("  {:<16} {}", kind, count);
    }
    if summary.problems.is_empty() {
        println!("No problems found.");
        return;
    }
    println!("Problems:");
    for problem in &summary.problems {
        println!("  - {}", problem);
    }
}
