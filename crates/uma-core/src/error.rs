// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Uma assistant.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Uma adapter traits and core operations.
#[derive(Debug, Error)]
pub enum UmaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// History store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A retrieval backend rejected or failed the search.
    #[error("backend `{backend}` unavailable: {message}")]
    Backend { backend: String, message: String },

    /// A retrieval backend did not answer within its time budget.
    #[error("backend `{backend}` timed out after {duration:?}")]
    BackendTimeout { backend: String, duration: Duration },

    /// The generation service failed (HTTP error, malformed response, empty answer).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UmaError {
    /// Shorthand for a storage error carrying only a message.
    pub fn storage(message: impl Into<String>) -> Self {
        UmaError::Storage {
            source: message.into().into(),
        }
    }

    /// Shorthand for a generation error without an underlying source.
    pub fn generation(message: impl Into<String>) -> Self {
        UmaError::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// True for the timeout flavours (`Timeout`, `BackendTimeout`).
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            UmaError::Timeout { .. } | UmaError::BackendTimeout { .. }
        )
    }
}
