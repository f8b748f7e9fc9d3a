//! End-to-end replay tests through the top-level crate.

mod common;

use common::*;
use provider_replay::{
    check_upgrade_consistency, match_pattern, normalize_transcript, replay_cases_parallel,
    replay_file, replay_json, replay_kinds, replay_sequence, CallKind, ReplayCase, ReplayConfig,
    ReplayError, StepOutcome, Transcript, Verdict,
};
use serde_json::json;

#[test]
fn test_lifecycle_transcript_replays_cleanly() {
    let fixture = write_transcript("lifecycle.jsonl", LIFECYCLE_JSONL);
    let report = assert_ok(replay_file(&fixture.path, &CounterProvider::v1()), "replay");
    assert_all_passed(&report, "lifecycle");
    assert_eq!(report.entries.len(), 5);
}

#[test]
fn test_replaying_out_of_order_breaks_dependent_calls() {
    let transcript = Transcript::parse(LIFECYCLE_JSONL).unwrap();
    let mut entries = transcript.entries().to_vec();
    // Read before Update now sees the unincremented value.
    entries.swap(1, 2);

    let report = replay_sequence(&entries, &CounterProvider::v1()).unwrap();
    assert!(!report.passed());
    let read = &report.entries[1];
    assert_eq!(read.method, CallKind::Read);
    assert_has_discrepancy_at(read, "#[\"properties\"][\"value\"]");
}

#[test]
fn test_replay_selected_kinds() {
    let transcript = Transcript::parse(LIFECYCLE_JSONL).unwrap();
    let provider = CounterProvider::v1();

    let report = replay_kinds(transcript.entries(), &[CallKind::Create], &provider).unwrap();
    assert_all_passed(&report, "create only");
    assert_eq!(report.entries.len(), 1);

    let err = assert_err(
        replay_kinds(transcript.entries(), &[CallKind::Invoke], &provider),
        "kinds absent from transcript",
    );
    assert_eq!(
        err,
        ReplayError::NoMatchingEntries {
            kinds: vec![CallKind::Invoke]
        }
    );
}

#[test]
fn test_single_entry_from_json() {
    let provider = CounterProvider::v1();
    // Bare method names are accepted.
    let report = replay_json(
        &provider,
        r#"{"method":"Create","request":{"urn":"urn:x","properties":{"start":3}},"response":{"id":"counter-1","properties":{"value":3}}}"#,
    )
    .unwrap();
    assert!(report.passed(), "{}", report);

    let report = replay_json(
        &provider,
        r#"{"method":"/provider.ResourceProvider/Update","request":{"id":"counter-9"},"errors":["counter counter-9 not found"]}"#,
    )
    .unwrap();
    assert!(report.passed(), "{}", report);
}

#[test]
fn test_unknown_method_fails_the_load() {
    let err = assert_err(
        Transcript::parse(r#"{"method":"/provider.ResourceProvider/StreamInvoke","request":{}}"#),
        "unknown method",
    );
    assert!(matches!(err, ReplayError::UnknownMethod { line: 1, .. }));
    assert_error_contains(err, "StreamInvoke", "unknown method");
}

#[test]
fn test_upgrade_consistency_per_resource() {
    let transcript = Transcript::parse(UPGRADE_JSON).unwrap();

    let same = check_upgrade_consistency(transcript.entries(), &CounterProvider::v1()).unwrap();
    assert!(same.passed(), "{}", same);

    let upgraded = check_upgrade_consistency(transcript.entries(), &CounterProvider::v2()).unwrap();
    let resources = upgraded.resources();
    assert!(!resources["urn:c1"], "string start is re-checked into a number");
    assert!(resources["urn:c2"]);

    let StepOutcome::Replayed { report } = &upgraded.steps[0].outcome else {
        panic!("expected a replayed diff");
    };
    assert_has_discrepancy_at(report, "#[\"changes\"]");
    assert_error_contains(upgraded.into_result().unwrap_err(), "urn:c1", "upgrade");
}

#[test]
fn test_upgrade_recheck_error_is_reported() {
    let transcript = Transcript::parse(
        r#"[
  {"method":"/provider.ResourceProvider/Check","request":{"urn":"urn:bad","news":{"start":"five"}},"response":{}},
  {"method":"/provider.ResourceProvider/Diff","request":{"urn":"urn:bad","olds":{},"news":{}},"response":{}}
]"#,
    )
    .unwrap();
    let report = check_upgrade_consistency(transcript.entries(), &CounterProvider::v2()).unwrap();
    assert!(matches!(
        &report.steps[0].outcome,
        StepOutcome::Fault {
            error: ReplayError::RecheckFailed { urn, .. }
        } if urn == "urn:bad"
    ));
}

#[test]
fn test_normalized_transcript_round_trips_through_jsonl() {
    let transcript = Transcript::parse(
        r#"{"method":"/provider.ResourceProvider/Check","request":{},"response":{"failures":[{"property":"z","reason":"r"},{"property":"a","reason":"r"}]}}"#,
    )
    .unwrap();
    let normalized = normalize_transcript(&transcript);
    let reparsed = Transcript::parse(&normalized.to_jsonl().unwrap()).unwrap();
    let failures = &reparsed.entries()[0].response.as_ref().unwrap()["failures"];
    assert!(match_pattern(
        &json!([{"property": "a", "reason": "*"}, {"property": "z", "reason": "*"}]),
        failures
    )
    .is_empty());
}

#[test]
fn test_independent_transcripts_in_parallel() {
    let lifecycle = Transcript::parse(LIFECYCLE_JSONL).unwrap();
    let cases = (0..8)
        .map(|i| ReplayCase {
            name: format!("counter-{}", i),
            transcript: lifecycle.clone(),
            provider: CounterProvider::v1(),
        })
        .collect();

    let reports = replay_cases_parallel(cases, &ReplayConfig::default());
    assert_eq!(reports.len(), 8);
    for report in &reports {
        assert!(report.passed(), "{} failed: {:?}", report.name, report.result);
    }
}

#[test]
fn test_unexpected_success_is_reported() {
    let transcript = Transcript::parse(
        r#"{"method":"/provider.ResourceProvider/Create","request":{"urn":"urn:x"},"errors":["quota exceeded"]}"#,
    )
    .unwrap();
    let report = replay_sequence(transcript.entries(), &CounterProvider::v1()).unwrap();
    assert!(matches!(
        report.entries[0].verdict,
        Verdict::MissingError { .. }
    ));
}
