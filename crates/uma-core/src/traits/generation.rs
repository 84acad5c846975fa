// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation service trait for the downstream language model.

use async_trait::async_trait;

use crate::error::UmaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerationParams;

/// Opaque text generation.
#[async_trait]
pub trait GenerationService: PluginAdapter {
    /// Produces a reply for the assembled prompt.
    async fn generate(&self, prompt: &str, params: &GenerationParams)
        -> Result<String, UmaError>;
}
