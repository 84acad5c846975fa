// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result merge engine.
//!
//! Dispatches one query to every registered backend concurrently, each call
//! bounded by its own timeout and by a semaphore shared across requests.
//! Surviving batches are min-max normalized per backend, weighted by the
//! backend's share of the surviving weight, ordered, deduplicated and
//! truncated to `k`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use uma_config::model::RetrievalConfig;
use uma_core::{DocumentMatch, HealthStatus, SearchHit, UmaError, VectorBackend};

use crate::dedup::dedup_sorted;
use crate::preprocess::preprocess_query;
use crate::scoring::{min_max_normalize, rank_order};

/// Knobs applied to every merge unless overridden per call.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub top_k: usize,
    pub timeout: Duration,
    pub dedup_threshold: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for MergeOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            timeout: config.timeout(),
            dedup_threshold: config.dedup_threshold,
        }
    }
}

/// How many backends contributed to a merged result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievalAvailability {
    /// Every backend answered in time.
    Complete,
    /// Some backends failed; the named ones contributed nothing.
    Degraded { failed: Vec<String> },
    /// No backend answered. The result set is empty.
    Unavailable,
}

/// Ranked, deduplicated evidence for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedResultSet {
    pub matches: Vec<DocumentMatch>,
    pub availability: RetrievalAvailability,
}

impl MergedResultSet {
    pub fn empty() -> Self {
        Self {
            matches: Vec::new(),
            availability: RetrievalAvailability::Complete,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            matches: Vec::new(),
            availability: RetrievalAvailability::Unavailable,
        }
    }

    /// True when every backend failed.
    pub fn is_unavailable(&self) -> bool {
        self.availability == RetrievalAvailability::Unavailable
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

struct RegisteredBackend {
    backend: Arc<dyn VectorBackend>,
    weight: f64,
}

/// Concurrent multi-backend search with score fusion.
pub struct MergeEngine {
    backends: Vec<RegisteredBackend>,
    options: MergeOptions,
    limiter: Arc<Semaphore>,
}

impl MergeEngine {
    /// Engine with its own concurrency bound of `max_concurrent` searches.
    pub fn new(options: MergeOptions, max_concurrent: usize) -> Self {
        Self::with_limiter(options, Arc::new(Semaphore::new(max_concurrent.max(1))))
    }

    /// Engine sharing an existing concurrency bound with other engines.
    pub fn with_limiter(options: MergeOptions, limiter: Arc<Semaphore>) -> Self {
        Self {
            backends: Vec::new(),
            options,
            limiter,
        }
    }

    /// Register a backend. The first registered backend is the primary one
    /// and wins ties.
    pub fn register(&mut self, backend: Arc<dyn VectorBackend>, weight: f64) -> &mut Self {
        debug!(backend = backend.name(), weight, "registered retrieval backend");
        self.backends.push(RegisteredBackend { backend, weight });
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_backend(mut self, backend: Arc<dyn VectorBackend>, weight: f64) -> Self {
        self.register(backend, weight);
        self
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Registered backend names with their weights, in priority order.
    pub fn backends(&self) -> Vec<(&str, f64)> {
        self.backends
            .iter()
            .map(|b| (b.backend.name(), b.weight))
            .collect()
    }

    /// Merge with the configured `top_k`, weights and timeout.
    pub async fn merge(&self, query: &str) -> MergedResultSet {
        let weights: Vec<f64> = self.backends.iter().map(|b| b.weight).collect();
        self.merge_with(query, self.options.top_k, &weights, self.options.timeout)
            .await
    }

    /// Merge with explicit parameters.
    ///
    /// `weights[i]` applies to the i-th registered backend; missing or
    /// non-positive entries fall back to the registration weight. Never
    /// fails: backend errors degrade the result, and if every backend fails
    /// the set is empty and marked [`RetrievalAvailability::Unavailable`].
    pub async fn merge_with(
        &self,
        query: &str,
        k: usize,
        weights: &[f64],
        timeout: Duration,
    ) -> MergedResultSet {
        let query = preprocess_query(query);
        if k == 0 || query.is_empty() {
            debug!(k, "nothing to search for");
            return MergedResultSet::empty();
        }
        if self.backends.is_empty() {
            warn!("no retrieval backends registered");
            return MergedResultSet::unavailable();
        }

        let outcomes = self.dispatch(&query, k, timeout).await;

        let mut failed = Vec::new();
        let mut batches = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let name = self.backends[index].backend.name();
            match outcome {
                Ok(hits) => {
                    let weight = weights
                        .get(index)
                        .copied()
                        .filter(|w| w.is_finite() && *w > 0.0)
                        .unwrap_or(self.backends[index].weight);
                    batches.push((index, weight, hits));
                }
                Err(e) => {
                    warn!(backend = name, error = %e, "backend contributed no results");
                    failed.push(name.to_string());
                }
            }
        }

        if batches.is_empty() {
            warn!(backends = self.backends.len(), "all retrieval backends failed");
            return MergedResultSet::unavailable();
        }

        let total_weight: f64 = batches.iter().map(|(_, w, _)| w).sum();
        let mut matches = Vec::new();
        for (index, weight, hits) in batches {
            let name = self.backends[index].backend.name();
            matches.extend(weigh_batch(name, index, hits, k, weight / total_weight));
        }

        matches.sort_by(rank_order);
        let before = matches.len();
        let mut matches = dedup_sorted(matches, self.options.dedup_threshold);
        let duplicates = before - matches.len();
        matches.truncate(k);

        info!(
            returned = matches.len(),
            duplicates,
            failed = failed.len(),
            "merged retrieval results"
        );

        let availability = if failed.is_empty() {
            RetrievalAvailability::Complete
        } else {
            RetrievalAvailability::Degraded { failed }
        };
        MergedResultSet {
            matches,
            availability,
        }
    }

    /// Run every backend search as its own task.
    ///
    /// Outcomes are returned in registration order. Dropping the returned
    /// future aborts the tasks still in flight.
    async fn dispatch(
        &self,
        query: &str,
        k: usize,
        timeout: Duration,
    ) -> Vec<Result<Vec<SearchHit>, UmaError>> {
        let mut tasks = JoinSet::new();

        for (index, registered) in self.backends.iter().enumerate() {
            let backend = Arc::clone(&registered.backend);
            let limiter = Arc::clone(&self.limiter);
            let query = query.to_string();
            tasks.spawn(async move {
                let name = backend.name().to_string();
                let search = async {
                    let _permit = limiter
                        .acquire_owned()
                        .await
                        .map_err(|e| UmaError::Internal(format!("search limiter closed: {e}")))?;
                    backend.search(&query, k).await
                };
                let outcome = match AssertUnwindSafe(tokio::time::timeout(timeout, search))
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(UmaError::BackendTimeout {
                        backend: name,
                        duration: timeout,
                    }),
                    Err(_) => Err(UmaError::Backend {
                        backend: name,
                        message: "search panicked".to_string(),
                    }),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<Vec<SearchHit>, UmaError>>> =
            (0..self.backends.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => warn!(error = %e, "search task did not complete"),
            }
        }

        outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.unwrap_or_else(|| {
                    Err(UmaError::Backend {
                        backend: self.backends[index].backend.name().to_string(),
                        message: "search task did not complete".to_string(),
                    })
                })
            })
            .collect()
    }

    /// Health of every registered backend, in priority order.
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        let checks = self.backends.iter().map(|registered| async move {
            let status = registered
                .backend
                .health_check()
                .await
                .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
            (registered.backend.name().to_string(), status)
        });
        futures::future::join_all(checks).await
    }
}

/// Normalize one backend batch and scale it by the backend's effective weight.
///
/// Hits with non-finite scores are dropped before normalization.
fn weigh_batch(
    name: &str,
    index: usize,
    hits: Vec<SearchHit>,
    k: usize,
    effective_weight: f64,
) -> Vec<DocumentMatch> {
    let hits: Vec<SearchHit> = hits
        .into_iter()
        .take(k)
        .filter(|hit| {
            let finite = hit.score.is_finite();
            if !finite {
                warn!(backend = name, score = hit.score, "dropping hit with non-finite score");
            }
            finite
        })
        .collect();

    let raw: Vec<f64> = hits.iter().map(|h| h.score).collect();
    let normalized = min_max_normalize(&raw);

    hits.into_iter()
        .zip(normalized)
        .enumerate()
        .map(|(rank, (hit, batch_score))| DocumentMatch {
            content: hit.content,
            source_backend: name.to_string(),
            backend_index: index,
            backend_rank: rank,
            raw_score: hit.score,
            batch_score,
            normalized_score: batch_score * effective_weight,
            metadata: hit.metadata,
        })
        .collect()
}
