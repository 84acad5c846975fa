// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds a [`MergeEngine`] from `[retrieval]` configuration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use uma_config::model::{BackendConfig, BackendKind, RetrievalConfig};
use uma_core::{UmaError, VectorBackend};
use uma_storage::Database;

use crate::fts::Fts5Backend;
use crate::http::HttpSearchBackend;
use crate::merge::{MergeEngine, MergeOptions};

/// Open the local full-text backend described by `config`.
pub async fn open_fts_backend(config: &BackendConfig) -> Result<Fts5Backend, UmaError> {
    let db = Database::open(&config.database_path).await?;
    Ok(Fts5Backend::new(&config.name, db, &config.collection))
}

/// Instantiate every configured backend in order and register it with its weight.
///
/// FTS backends pointing at the same database file share one connection;
/// HTTP backends share one client.
pub async fn build_merge_engine(config: &RetrievalConfig) -> Result<MergeEngine, UmaError> {
    let mut engine = MergeEngine::new(MergeOptions::from(config), config.max_concurrent_searches);
    let mut databases: HashMap<&str, Database> = HashMap::new();
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| UmaError::Config(format!("failed to build HTTP client: {e}")))?;

    for backend in &config.backends {
        let instance: Arc<dyn VectorBackend> = match backend.kind {
            BackendKind::Fts => {
                let db = match databases.get(backend.database_path.as_str()) {
                    Some(db) => db.clone(),
                    None => {
                        let db = Database::open(&backend.database_path).await?;
                        databases.insert(&backend.database_path, db.clone());
                        db
                    }
                };
                Arc::new(Fts5Backend::new(&backend.name, db, &backend.collection))
            }
            BackendKind::Http => {
                let url = backend.url.as_deref().ok_or_else(|| {
                    UmaError::Config(format!("backend `{}` has no url", backend.name))
                })?;
                Arc::new(HttpSearchBackend::with_client(
                    &backend.name,
                    url,
                    client.clone(),
                ))
            }
        };
        engine.register(instance, backend.weight);
    }

    info!(backends = config.backends.len(), "merge engine ready");
    Ok(engine)
}
