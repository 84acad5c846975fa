// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all collaborators implement.

use async_trait::async_trait;

use crate::error::UmaError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Uma adapters.
///
/// Every adapter (retrieval backend, history store, generation service)
/// provides identity and a health check.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, UmaError>;
}
