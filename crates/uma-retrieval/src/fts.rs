// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local full-text backend over an SQLite FTS5 document collection.

use async_trait::async_trait;
use tracing::debug;

use uma_core::{
    AdapterType, HealthStatus, Metadata, PluginAdapter, SearchHit, UmaError, VectorBackend,
};
use uma_storage::queries::documents;
use uma_storage::Database;

/// BM25 search over one collection of the document database.
///
/// FTS5 ranks with lower-is-better values, so scores are negated before they
/// are handed to the merge engine.
pub struct Fts5Backend {
    name: String,
    db: Database,
    collection: String,
}

impl Fts5Backend {
    pub fn new(name: impl Into<String>, db: Database, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Add a document to this backend's collection.
    pub async fn add_document(&self, content: &str, metadata: &Metadata) -> Result<i64, UmaError> {
        let id = documents::add_document(&self.db, &self.collection, content, metadata).await?;
        debug!(backend = %self.name, id, "document added");
        Ok(id)
    }

    pub async fn document_count(&self) -> Result<u64, UmaError> {
        documents::count_documents(&self.db, &self.collection).await
    }
}

#[async_trait]
impl PluginAdapter for Fts5Backend {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        match self.document_count().await? {
            0 => Ok(HealthStatus::Degraded(format!(
                "collection `{}` is empty",
                self.collection
            ))),
            _ => Ok(HealthStatus::Healthy),
        }
    }
}

#[async_trait]
impl VectorBackend for Fts5Backend {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, UmaError> {
        let rows = documents::search_bm25(&self.db, &self.collection, query, k)
            .await
            .map_err(|e| UmaError::Backend {
                backend: self.name.clone(),
                message: e.to_string(),
            })?;
        Ok(rows
            .into_iter()
            .map(|(doc, bm25)| {
                let mut hit = SearchHit::new(doc.content, -bm25);
                hit.metadata = doc.metadata;
                hit.with_meta("document_id", doc.id)
            })
            .collect())
    }
}
