// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Uma pipeline.
//!
//! Each test loads configuration from TOML, ingests documents into a temp
//! SQLite file, stores history in another, and talks to a mocked
//! chat-completions endpoint. Tests are independent and order-insensitive.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use uma_agent::ResponseOrchestrator;
use uma_config::UmaConfig;
use uma_core::{HistoryStore, Metadata, Role};
use uma_openai::OpenAiGenerator;
use uma_retrieval::{build_merge_engine, open_fts_backend};
use uma_storage::SqliteHistoryStore;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 12, "total_tokens": 132}
    })
}

fn config(dir: &TempDir, server: &MockServer) -> UmaConfig {
    let documents = dir.path().join("documents.db");
    let history = dir.path().join("uma.db");
    let toml = format!(
        r#"
[agent]
fallback_message = "Sorry, please try again."

[storage]
database_path = "{history}"

[generation]
base_url = "{base}"
api_key = "sk-test"
timeout_ms = 2000

[[retrieval.backends]]
name = "primary"
kind = "fts"
weight = 0.6
database_path = "{documents}"
collection = "documents"

[[retrieval.backends]]
name = "secondary"
kind = "fts"
weight = 0.4
database_path = "{documents}"
collection = "notes"
"#,
        history = history.display(),
        documents = documents.display(),
        base = server.uri(),
    );
    uma_config::load_and_validate_str(&toml).expect("test config should be valid")
}

async fn ingest(config: &UmaConfig) {
    let docs = [
        (0, "Practice moved to 10am on Saturday at the riverside field"),
        (0, "The club picnic is cancelled this year"),
        (1, "Remember to bring shin guards to practice"),
    ];
    for (backend, content) in docs {
        let fts = open_fts_backend(&config.retrieval.backends[backend])
            .await
            .unwrap();
        fts.add_document(content, &Metadata::new()).await.unwrap();
    }
}

async fn pipeline(config: &UmaConfig) -> (ResponseOrchestrator, Arc<SqliteHistoryStore>) {
    let store = Arc::new(SqliteHistoryStore::open(&config.storage).await.unwrap());
    let engine = Arc::new(build_merge_engine(&config.retrieval).await.unwrap());
    let generator = Arc::new(OpenAiGenerator::new(&config.generation).unwrap());
    let orchestrator = ResponseOrchestrator::from_config(config, engine, store.clone(), generator);
    (orchestrator, store)
}

#[tokio::test]
async fn answers_with_evidence_and_persists_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Practice moved to 10am"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Practice is at 10am.")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server);
    ingest(&config).await;
    let (orchestrator, store) = pipeline(&config).await;

    let response = orchestrator
        .respond("u1", "s1", "When is practice?")
        .await;

    assert_eq!(response.text, "Practice is at 10am.");
    assert!(!response.is_fallback());
    assert_eq!(response.metadata.response_type, "general");
    assert!(response.metadata.evidence_count >= 2);
    assert!(response.metadata.persisted);

    let turns = store.recent_turns("u1", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].content, "Practice is at 10am.");
    assert_eq!(turns[1].metadata["error_occurred"], json!(false));

    let profile = store.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.turn_count, 1);
    assert!(profile.interests.contains(&"practice".to_string()));
}

#[tokio::test]
async fn generation_failure_returns_configured_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "bad request", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server);
    ingest(&config).await;
    let (orchestrator, store) = pipeline(&config).await;

    let response = orchestrator
        .respond("u1", "s1", "When is practice?")
        .await;

    assert_eq!(response.text, "Sorry, please try again.");
    assert!(response.is_fallback());

    let stats = store.statistics("u1").await.unwrap();
    assert_eq!(stats.total_turns, 2);
    assert_eq!(stats.error_turns, 1);
}

#[tokio::test]
async fn second_question_sees_first_exchange_in_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("assistant: Practice is at 10am."))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Bring shin guards.")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Practice is at 10am.")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config(&dir, &server);
    ingest(&config).await;
    let (orchestrator, _store) = pipeline(&config).await;

    let first = orchestrator.respond("u1", "s1", "When is practice?").await;
    assert_eq!(first.text, "Practice is at 10am.");

    let second = orchestrator
        .respond("u1", "s1", "What should I bring to practice?")
        .await;
    assert_eq!(second.text, "Bring shin guards.");
    assert_eq!(second.metadata.history_turns, 2);
}
