// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uma_context::{AssemblerOptions, ContextAssembler, budget};
use uma_core::{ConversationTurn, DocumentMatch, HistoryStore, Metadata, Role, UserProfile};
use uma_retrieval::{MergedResultSet, RetrievalAvailability};
use uma_router::QueryKind;
use uma_test_utils::InMemoryHistoryStore;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 13, 12, 0, 0).unwrap()
}

fn doc(content: &str, score: f64, timestamp: Option<&str>) -> DocumentMatch {
    let mut metadata = Metadata::new();
    if let Some(ts) = timestamp {
        metadata.insert("timestamp".into(), serde_json::Value::from(ts));
    }
    DocumentMatch {
        content: content.into(),
        source_backend: "primary".into(),
        backend_index: 0,
        backend_rank: 0,
        raw_score: score,
        batch_score: score,
        normalized_score: score,
        metadata,
    }
}

fn merged(matches: Vec<DocumentMatch>) -> MergedResultSet {
    MergedResultSet {
        matches,
        availability: RetrievalAvailability::Complete,
    }
}

async fn seeded_store() -> Arc<InMemoryHistoryStore> {
    let store = Arc::new(InMemoryHistoryStore::new());
    for (i, text) in ["first question", "first answer", "second question", "second answer"]
        .iter()
        .enumerate()
    {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        store
            .append_turn(&ConversationTurn::new("u1", "s1", role, *text))
            .await
            .unwrap();
    }
    store
        .put_profile(UserProfile {
            user_id: "u1".into(),
            interests: vec!["running".into()],
            turn_count: 2,
            last_interaction: Some(now()),
        })
        .await;
    store
}

#[tokio::test]
async fn assembles_all_zones_in_order() {
    let store = seeded_store().await;
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());
    let evidence = merged(vec![doc("Club run on Saturday", 0.9, None)]);

    let payload = assembler
        .assemble_at("u1", "Any tips for my run?", &evidence, 3, 4000, now())
        .await;

    assert_eq!(payload.kind, QueryKind::General);
    let text = payload.as_str();
    assert!(text.starts_with(budget::PROFILE_HEADER));
    assert!(text.contains("Interests: running"));
    // Window of 3: the oldest of the four turns is not read.
    assert!(!text.contains("first question"));
    assert!(text.contains("assistant: first answer"));
    assert!(text.contains("1. [primary] Club run on Saturday"));
    assert!(text.ends_with("Any tips for my run?"));
    assert_eq!(payload.stats.history_turns, 3);
    assert_eq!(payload.stats.evidence_count, 1);
    assert!(payload.stats.profile_included);
    assert!(!payload.over_budget);
}

#[tokio::test]
async fn time_scoped_query_filters_evidence_by_window() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());
    let evidence = merged(vec![
        doc("Derby on Friday", 0.9, Some("2026-05-15T18:00:00Z")),
        doc("Last season's final", 0.8, Some("2025-10-01")),
        doc("Bring water bottles", 0.5, None),
    ]);

    let payload = assembler
        .assemble_at("u1", "What's the weather event next week?", &evidence, 6, 4000, now())
        .await;

    assert!(matches!(payload.kind, QueryKind::TimeScoped(_)));
    assert!(payload.as_str().contains("Derby on Friday"));
    assert!(payload.as_str().contains("Bring water bottles"));
    assert!(!payload.as_str().contains("Last season's final"));
    assert_eq!(payload.stats.evidence_filtered, 1);
    assert_eq!(payload.stats.evidence_count, 2);
}

#[tokio::test]
async fn tight_budget_drops_history_before_evidence() {
    let store = seeded_store().await;
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());
    let evidence = merged(vec![
        doc("alpha evidence", 0.9, None),
        doc("omega evidence", 0.1, None),
    ]);
    let query = "What should I pack?";

    let roomy = assembler
        .assemble_at("u1", query, &evidence, 4, 10_000, now())
        .await;
    let budget = roomy.char_len() - 5;
    let tight = assembler
        .assemble_at("u1", query, &evidence, 4, budget, now())
        .await;

    assert!(tight.char_len() <= budget);
    assert!(!tight.as_str().contains("first question"));
    assert!(tight.as_str().contains("omega evidence"));
    assert!(tight.as_str().contains(query));
    assert!(tight.stats.truncated_entries >= 1);
}

#[tokio::test]
async fn query_is_never_cut() {
    let store = seeded_store().await;
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());
    let query = "a very long question ".repeat(10);

    let payload = assembler
        .assemble_at("u1", &query, &merged(vec![]), 6, 50, now())
        .await;

    assert_eq!(payload.as_str(), query);
    assert!(payload.over_budget);
}

#[tokio::test]
async fn store_failure_degrades_to_evidence_only() {
    let store = seeded_store().await;
    store.set_fail_reads(true);
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());

    let payload = assembler
        .assemble_at(
            "u1",
            "Where is practice?",
            &merged(vec![doc("Practice at the river ground", 0.7, None)]),
            6,
            4000,
            now(),
        )
        .await;

    assert!(!payload.stats.profile_included);
    assert_eq!(payload.stats.history_turns, 0);
    assert!(payload.as_str().contains("river ground"));
    assert!(payload.as_str().ends_with("Where is practice?"));
}

#[tokio::test]
async fn assembly_is_deterministic() {
    let store = seeded_store().await;
    let assembler = ContextAssembler::new(store, AssemblerOptions::default());
    let evidence = merged(vec![doc("one", 0.9, None), doc("two", 0.4, None)]);

    let a = assembler.assemble_at("u1", "q?", &evidence, 6, 300, now()).await;
    let b = assembler.assemble_at("u1", "q?", &evidence, 6, 300, now()).await;
    assert_eq!(a.text, b.text);
    assert_eq!(a.stats, b.stats);
}
