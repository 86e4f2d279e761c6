//! Integration tests for the two-phase reconciliation engine
//!
//! Test coverage:
//! - End-to-end ledger and report outcomes for simple corpora
//! - Field mismatches leave the ledger alone
//! - Phase barrier: no replacement fetch overlaps a legacy fetch
//! - Ledger carry-over between runs and idempotent reruns
//! - Fetch failures and lookup gaps
//! - Empty message objects are no answer at all

mod common;

use std::sync::Arc;

use common::{engine_config, message, single, Call, ScriptedClient, LEGACY, REPLACEMENT};
use message_parity::domain::models::{IdentityKey, MissingLedger, Payload, Query, RecordState};
use message_parity::services::{verify, ReconciliationEngine};
use message_parity::FetchError;

fn queries(raw: &[&str]) -> Vec<Query> {
    raw.iter().map(|q| Query::new(*q)).collect()
}

fn key(desc: &str) -> IdentityKey {
    IdentityKey::from_description(desc)
}

#[tokio::test]
async fn test_matching_answers_leave_empty_ledger() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond(LEGACY, "/q1", single("desc1"))
            .respond(REPLACEMENT, "/q1", single("desc1")),
    );
    let engine = ReconciliationEngine::new(client.clone(), engine_config(50));

    let mut result = engine
        .run(queries(&["/q1", "/q2"]), MissingLedger::new())
        .await;
    let summary = verify(&mut result.records);

    assert_eq!(result.records.len(), 1, "q2 has no legacy answer, so no record");
    let record = &result.records[0];
    assert_eq!(record.query.as_str(), "/q1");
    assert_eq!(record.state(), RecordState::Completed);
    assert!(record.matched);
    assert!(result.ledger.is_empty());
    assert_eq!(summary.matched, 1);
    assert_eq!(client.fetch_count(), 4);
}

#[tokio::test]
async fn test_unanswered_message_lands_in_ledger() {
    let client = Arc::new(ScriptedClient::new().respond(LEGACY, "/q1", single("desc2")));
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let mut result = engine.run(queries(&["/q1"]), MissingLedger::new()).await;
    let summary = verify(&mut result.records);

    assert_eq!(result.ledger.len(), 1);
    assert!(result.ledger.contains(&key("desc2")));
    assert_eq!(result.records.len(), 1);
    assert!(result.records[0].replacement.is_none());
    assert!(!result.records[0].matched);
    assert_eq!(summary.gaps, 1);
    assert_eq!(result.stats.ledger_added, 1);
}

#[tokio::test]
async fn test_field_mismatch_does_not_touch_ledger() {
    let mut replacement = message("desc1");
    replacement.action_text = "Play now".to_string();
    let client = Arc::new(
        ScriptedClient::new()
            .respond(LEGACY, "/q1", single("desc1"))
            .respond(REPLACEMENT, "/q1", Payload::Single(replacement)),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let mut result = engine.run(queries(&["/q1"]), MissingLedger::new()).await;
    let summary = verify(&mut result.records);

    assert!(result.ledger.is_empty());
    assert!(!result.records[0].matched);
    assert_eq!(result.records[0].mismatched_fields, vec!["action_text"]);
    assert_eq!(summary.mismatched, 1);
}

#[tokio::test]
async fn test_identity_key_ignores_surrounding_whitespace() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond(LEGACY, "/q1", single("  desc1\n"))
            .respond(REPLACEMENT, "/q1", single("desc1")),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let result = engine.run(queries(&["/q1"]), MissingLedger::new()).await;

    assert!(result.ledger.is_empty());
    assert_eq!(result.stats.ledger_resolved, 1);
}

#[tokio::test]
async fn test_phases_never_overlap() {
    let mut client = ScriptedClient::new();
    for q in ["/a", "/b", "/c", "/d", "/e"] {
        client = client
            .respond(LEGACY, q, single(q))
            .respond(REPLACEMENT, q, single(q));
    }
    let client = Arc::new(client);
    let engine = ReconciliationEngine::new(client.clone(), engine_config(2));

    engine
        .run(queries(&["/a", "/b", "/c", "/d", "/e"]), MissingLedger::new())
        .await;

    let calls = client.calls();
    assert_eq!(calls.len(), 20);

    // Whenever a fetch starts, nothing from the other endpoint is in flight.
    let mut in_flight: Vec<&Call> = Vec::new();
    for call in &calls {
        match call {
            Call::Start { .. } => {
                assert!(
                    in_flight.iter().all(|c| c.endpoint() == call.endpoint()),
                    "{call:?} started while {in_flight:?} in flight"
                );
                in_flight.push(call);
            }
            Call::End { endpoint, query } => {
                in_flight.retain(|c| {
                    !matches!(c, Call::Start { endpoint: e, query: q } if e == endpoint && q == query)
                });
            }
        }
    }

    // Starts come in per-batch phase runs: legacy then replacement, batch by batch.
    let starts: Vec<(&str, &str)> = calls
        .iter()
        .filter_map(|call| match call {
            Call::Start { endpoint, query } => Some((endpoint.as_str(), query.as_str())),
            Call::End { .. } => None,
        })
        .collect();
    assert_eq!(
        starts,
        vec![
            (LEGACY, "/a"),
            (LEGACY, "/b"),
            (REPLACEMENT, "/a"),
            (REPLACEMENT, "/b"),
            (LEGACY, "/c"),
            (LEGACY, "/d"),
            (REPLACEMENT, "/c"),
            (REPLACEMENT, "/d"),
            (LEGACY, "/e"),
            (REPLACEMENT, "/e"),
        ]
    );
}

#[tokio::test]
async fn test_fetches_within_a_phase_run_concurrently() {
    let client = Arc::new(ScriptedClient::new());
    let engine = ReconciliationEngine::new(client.clone(), engine_config(3));

    engine
        .run(queries(&["/a", "/b", "/c"]), MissingLedger::new())
        .await;

    let calls = client.calls();
    let first_end = calls.iter().position(|c| !c.is_start()).unwrap();
    assert_eq!(first_end, 3, "all three legacy fetches start before any completes");
}

#[tokio::test]
async fn test_records_follow_batch_order() {
    let mut client = ScriptedClient::new();
    for q in ["/1", "/2", "/3", "/4"] {
        client = client.respond(LEGACY, q, single(q));
    }
    let engine = ReconciliationEngine::new(Arc::new(client), engine_config(3));

    let result = engine
        .run(queries(&["/1", "/2", "/3", "/4"]), MissingLedger::new())
        .await;

    let order: Vec<&str> = result.records.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(order, vec!["/1", "/2", "/3", "/4"]);
    assert_eq!(result.stats.batches, 2);
}

#[tokio::test]
async fn test_ledger_carries_over_between_runs() {
    let first = Arc::new(ScriptedClient::new().respond(LEGACY, "/q1", single("pending")));
    let first_run = ReconciliationEngine::new(first, engine_config(50))
        .run(queries(&["/q1"]), MissingLedger::new())
        .await;
    assert!(first_run.ledger.contains(&key("pending")));

    // A later run resolves the entry through a different query.
    let second = Arc::new(ScriptedClient::new().respond(REPLACEMENT, "/q2", single("pending")));
    let second_run = ReconciliationEngine::new(second, engine_config(50))
        .run(queries(&["/q2"]), first_run.ledger)
        .await;

    assert!(second_run.ledger.is_empty());
    assert_eq!(second_run.stats.ledger_resolved, 1);
    assert_eq!(second_run.stats.lookup_gaps, 1);
    assert!(second_run.records.is_empty());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond(LEGACY, "/q1", single("one"))
            .respond(LEGACY, "/q2", single("two"))
            .respond(REPLACEMENT, "/q2", single("two")),
    );
    let engine = ReconciliationEngine::new(client, engine_config(1));
    let corpus = queries(&["/q1", "/q2"]);

    let first = engine.run(corpus.clone(), MissingLedger::new()).await;
    let second = engine.run(corpus, first.ledger.clone()).await;

    assert_eq!(first.ledger.entries(), second.ledger.entries());
    assert_eq!(second.ledger.len(), 1);
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_duplicate_messages_in_a_batch_are_recorded_once() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond(LEGACY, "/q1", single("shared"))
            .respond(LEGACY, "/q2", single("shared ")),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let result = engine
        .run(queries(&["/q1", "/q2"]), MissingLedger::new())
        .await;

    assert_eq!(result.ledger.len(), 1);
    assert_eq!(result.records.len(), 2);
}

#[tokio::test]
async fn test_duplicate_queries_fetched_once() {
    let client = Arc::new(ScriptedClient::new());
    let engine = ReconciliationEngine::new(client.clone(), engine_config(50));

    let result = engine
        .run(queries(&["/q1", "/q1", "/q2"]), MissingLedger::new())
        .await;

    assert_eq!(result.stats.queries, 2);
    assert_eq!(result.stats.duplicate_queries, 1);
    assert_eq!(client.fetch_count(), 4);
}

#[tokio::test]
async fn test_failures_are_counted_and_treated_as_empty() {
    let client = Arc::new(
        ScriptedClient::new()
            .fail(LEGACY, "/q1", FetchError::Timeout)
            .respond(REPLACEMENT, "/q1", single("stale"))
            .fail(REPLACEMENT, "/q2", FetchError::Status(503))
            .respond(LEGACY, "/q2", single("fresh")),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));
    let (ledger, _) = MissingLedger::from_entries(vec![message("stale")]);

    let result = engine.run(queries(&["/q1", "/q2"]), ledger).await;

    assert_eq!(result.stats.legacy.failures, 1);
    assert_eq!(result.stats.replacement.failures, 1);
    assert_eq!(result.stats.lookup_gaps, 1);
    // The replacement answer for q1 still resolves the pre-existing entry.
    assert!(!result.ledger.contains(&key("stale")));
    assert!(result.ledger.contains(&key("fresh")));
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].query.as_str(), "/q2");
    assert!(result.records[0].replacement.is_none());
}

#[tokio::test]
async fn test_list_payloads_touch_every_message() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond(
                LEGACY,
                "/q1",
                Payload::List(vec![message("a"), message("b")]),
            )
            .respond(REPLACEMENT, "/q1", Payload::List(vec![message("a")])),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let result = engine.run(queries(&["/q1"]), MissingLedger::new()).await;

    assert_eq!(result.ledger.len(), 1);
    assert!(result.ledger.contains(&key("b")));
}

#[tokio::test]
async fn test_empty_legacy_message_object_is_not_recorded() {
    let client = Arc::new(
        ScriptedClient::new()
            .respond_body(
                LEGACY,
                "/q1",
                serde_json::json!({"content": {"title": "Nature Cat"}, "messages": [{}]}),
            )
            .respond(LEGACY, "/q2", single("real")),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));

    let result = engine
        .run(queries(&["/q1", "/q2"]), MissingLedger::new())
        .await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].query.as_str(), "/q2");
    assert_eq!(result.ledger.len(), 1);
    assert!(!result.ledger.contains(&key("")));
    assert_eq!(result.stats.legacy.empty, 1);
}

#[tokio::test]
async fn test_empty_replacement_message_object_resolves_nothing() {
    let client = Arc::new(
        ScriptedClient::new().respond_body(
            REPLACEMENT,
            "/q1",
            serde_json::json!({"messages": [{}]}),
        ),
    );
    let engine = ReconciliationEngine::new(client, engine_config(50));
    let (ledger, _) = MissingLedger::from_entries(vec![message("")]);

    let result = engine.run(queries(&["/q1"]), ledger).await;

    assert!(result.ledger.contains(&key("")));
    assert_eq!(result.stats.ledger_resolved, 0);
}
