// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by the subcommands: tracing setup and orchestrator assembly.

use std::sync::Arc;

use tracing::info;
use uma_agent::ResponseOrchestrator;
use uma_config::UmaConfig;
use uma_core::UmaError;
use uma_openai::OpenAiGenerator;
use uma_retrieval::build_merge_engine;
use uma_storage::SqliteHistoryStore;

/// Initializes the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("uma={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the history store, builds the merge engine and the generator, and
/// wires them into an orchestrator.
pub async fn build_orchestrator(config: &UmaConfig) -> Result<ResponseOrchestrator, UmaError> {
    let store = Arc::new(SqliteHistoryStore::open(&config.storage).await?);
    let engine = Arc::new(build_merge_engine(&config.retrieval).await?);
    let generator = Arc::new(OpenAiGenerator::new(&config.generation).inspect_err(|_| {
        eprintln!(
            "error: generation API key required. Set generation.api_key, UMA_GENERATION_API_KEY or OPENAI_API_KEY"
        );
    })?);

    info!(
        backends = engine.backends().len(),
        database = %config.storage.database_path,
        "orchestrator ready"
    );
    Ok(ResponseOrchestrator::from_config(config, engine, store, generator))
}
