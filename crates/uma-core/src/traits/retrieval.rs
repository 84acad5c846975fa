// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval backend trait.

use async_trait::async_trait;

use crate::error::UmaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SearchHit;

/// A similarity search over a collection of embedded documents.
///
/// Backends are stateless from the engine's point of view and
/// interchangeable: the merge engine only sees this trait plus a weight.
#[async_trait]
pub trait VectorBackend: PluginAdapter {
    /// Returns at most `k` hits ranked best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, UmaError>;
}
