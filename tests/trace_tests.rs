//! Tests for trace bookkeeping and queries.

mod common;

use common::*;
use ioa_harness::*;
use std::sync::Arc;

#[test]
fn test_extend_builds_well_formed_trace() {
    let mut trace = Trace::new();
    trace.extend([timeout(), new_round()]).unwrap();
    trace.extend([vote_verified()]).unwrap();
    trace.extend(Vec::<EventRef>::new()).unwrap();

    assert_eq!(trace.len(), 3);
    assert!(trace.check_well_formed().is_ok());
}

#[test]
fn test_extend_rejects_nil_event() {
    let mut trace = Trace::new();
    trace.extend([timeout()]).unwrap();

    let result = trace.extend([Some(new_round()), None, Some(new_period())]);
    assert_eq!(result, Err(TraceError::NilEvent { index: 1 }));
    assert_eq!(trace.len(), 1, "rejected extend must not append");

    let err_str = result.unwrap_err().to_string();
    assert!(err_str.contains("nil event"), "got: {err_str}");
}

#[test]
fn test_malformed_trace_detected() {
    let trace = Trace::from_slots(vec![Some(timeout()), Some(new_round()), None]);
    assert_eq!(
        trace.check_well_formed(),
        Err(TraceError::MalformedTrace { index: 2 })
    );
    assert_eq!(trace.iter().count(), 2);
}

#[test]
fn test_contains_uses_fingerprints() {
    let trace: Trace = [timeout(), vote_filtered("signature check failed")]
        .into_iter()
        .collect();

    assert!(trace.contains(&common::Tagged(EventType::Timeout)));
    assert!(!trace.contains(&common::Tagged(EventType::NewRound)));

    // the error payload is projected away
    assert!(trace.contains(vote_filtered("any other error").as_ref()));
}

#[test]
fn test_contains_substring_and_count() {
    let trace: Trace = [
        Arc::new(VotePresent {
            round: 7,
            sender: "alice",
        }) as EventRef,
        timeout(),
        Arc::new(VotePresent {
            round: 7,
            sender: "alice",
        }) as EventRef,
        Arc::new(VotePresent {
            round: 8,
            sender: "bob",
        }) as EventRef,
    ]
    .into_iter()
    .collect();

    assert!(trace.contains_substring("sender=bob"));
    assert!(!trace.contains_substring("sender=carol"));

    let alice = VotePresent {
        round: 7,
        sender: "alice",
    };
    assert_eq!(trace.count_event(&alice), 2);
    assert_eq!(trace.count_event(&common::Tagged(EventType::NewPeriod)), 0);
    assert!(trace.contains_fn(|e| e.event_type() == EventType::VotePresent));
}

#[test]
fn test_count_actions_ignores_routing_events() {
    let trace: Trace = [
        timeout(),
        ev(Broadcast("next-vote")),
        tagged(EventType::VoteAccepted),
        ev(Broadcast("bundle")),
    ]
    .into_iter()
    .collect();

    assert_eq!(trace.count_actions(), 2);
}

#[test]
fn test_render_lists_fingerprints() {
    let trace: Trace = [timeout(), new_round(), vote_verified()].into_iter().collect();
    let rendered = trace.to_string();

    assert!(rendered.starts_with("{\n"));
    assert!(rendered.contains("\ttimeout |\tnewRound |\n"));
    assert!(rendered.contains("\tvoteVerified |\n"));
    assert!(rendered.ends_with("}\n"));
}

#[test]
fn test_render_truncates_to_trailing_window() {
    let trace: Trace = (0..200).map(|_| timeout()).collect();

    let full = trace.render(None);
    let truncated = trace.render(Some(40));

    assert!(full.len() > 40);
    assert!(truncated.starts_with("(truncated...)"));
    assert!(truncated.ends_with("}\n"));
    assert!(full.ends_with(truncated.trim_start_matches("(truncated...)\t")));

    let short: Trace = [timeout()].into_iter().collect();
    assert_eq!(short.render(Some(500)), short.render(None));
}

#[test]
fn test_suffix_and_divergence() {
    let trace: Trace = [timeout(), new_round(), timeout(), new_period()]
        .into_iter()
        .collect();
    let extension = trace.suffix(2);
    assert_eq!(extension.len(), 2);

    let reference: Trace = [timeout(), new_round()].into_iter().collect();
    assert_eq!(extension.first_divergence(&reference), Some(1));
    assert_eq!(trace.first_divergence(&reference), None);
}
