// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote search backend speaking a small JSON protocol.
//!
//! Request: `POST {url}` with `{"query": ..., "k": ...}`.
//! Response: `[{"content": ..., "score": ..., "metadata": {...}}]`, higher
//! score meaning more relevant.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use uma_core::{AdapterType, HealthStatus, PluginAdapter, SearchHit, UmaError, VectorBackend};

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

/// Search backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpSearchBackend {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, UmaError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| UmaError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(name, url, client))
    }

    /// Share a connection pool with other backends.
    pub fn with_client(
        name: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }

    fn backend_err(&self, message: String) -> UmaError {
        UmaError::Backend {
            backend: self.name.clone(),
            message,
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpSearchBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    /// A one-result probe search.
    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        match self.search("health", 1).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl VectorBackend for HttpSearchBackend {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, UmaError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SearchRequest { query, k })
            .send()
            .await
            .map_err(|e| self.backend_err(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(backend = %self.name, status = %status, "search response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.backend_err(format!("search returned {status}: {body}")));
        }

        response
            .json::<Vec<SearchHit>>()
            .await
            .map_err(|e| self.backend_err(format!("malformed search response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_query_and_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_json(serde_json::json!({"query": "jazz", "k": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"content": "jazz night", "score": 0.8, "metadata": {"timestamp": "2026-05-02"}},
                {"content": "blues club", "score": 0.2}
            ])))
            .mount(&server)
            .await;

        let backend = HttpSearchBackend::new("remote", format!("{}/search", server.uri())).unwrap();
        let hits = backend.search("jazz", 3).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "jazz night");
        assert_eq!(hits[0].metadata["timestamp"], "2026-05-02");
        assert!(hits[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn server_error_maps_to_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let backend = HttpSearchBackend::new("remote", server.uri()).unwrap();
        let err = backend.search("jazz", 3).await.unwrap_err();
        assert!(matches!(err, UmaError::Backend { ref backend, .. } if backend == "remote"));
        assert!(err.to_string().contains("503"));
        assert!(matches!(
            backend.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = HttpSearchBackend::new("remote", server.uri()).unwrap();
        assert!(backend.search("jazz", 3).await.is_err());
    }
}
