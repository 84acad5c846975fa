// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock retrieval backend with scripted hits, latency and failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use uma_core::{AdapterType, HealthStatus, PluginAdapter, SearchHit, UmaError, VectorBackend};

/// A backend that returns a fixed list of hits.
///
/// Optional delay is applied before answering, so timeouts can be exercised
/// with paused tokio time.
pub struct MockBackend {
    name: String,
    hits: Vec<SearchHit>,
    delay: Option<Duration>,
    fail_with: Option<String>,
    panic: bool,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(name: &str, hits: Vec<SearchHit>) -> Self {
        Self {
            name: name.to_string(),
            hits,
            delay: None,
            fail_with: None,
            panic: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor from `(content, score)` pairs.
    pub fn scored(name: &str, hits: &[(&str, f64)]) -> Self {
        Self::new(
            name,
            hits.iter()
                .map(|(content, score)| SearchHit::new(*content, *score))
                .collect(),
        )
    }

    /// A backend whose every search fails with `message`.
    pub fn failing(name: &str, message: &str) -> Self {
        let mut backend = Self::new(name, Vec::new());
        backend.fail_with = Some(message.to_string());
        backend
    }

    /// A backend whose search panics.
    pub fn panicking(name: &str) -> Self {
        let mut backend = Self::new(name, Vec::new());
        backend.panic = true;
        backend
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `search` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Retrieval
    }

    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        match &self.fail_with {
            Some(message) => Ok(HealthStatus::Unhealthy(message.clone())),
            None => Ok(HealthStatus::Healthy),
        }
    }
}

#[async_trait]
impl VectorBackend for MockBackend {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<SearchHit>, UmaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic {
            panic!("mock backend `{}` panicked", self.name);
        }
        if let Some(message) = &self.fail_with {
            return Err(UmaError::Backend {
                backend: self.name.clone(),
                message: message.clone(),
            });
        }
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}
