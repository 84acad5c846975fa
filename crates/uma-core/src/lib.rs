// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Uma assistant.
//!
//! This crate provides the error taxonomy, the data model shared by the
//! retrieval, context and agent crates, and the adapter traits that external
//! collaborators (retrieval backends, history store, generation service)
//! implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::UmaError;
pub use types::{
    AdapterType, ConversationTurn, DocumentMatch, GenerationParams, HealthStatus, Metadata,
    ProfileDelta, Role, SearchHit, UserProfile,
};

pub use traits::{
    GenerationService, HistoryStore, InterestExtractor, PluginAdapter, VectorBackend,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uma_error_display() {
        let err = UmaError::BackendTimeout {
            backend: "primary".into(),
            duration: std::time::Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "backend `primary` timed out after 250ms");
        assert!(err.is_timeout());

        let err = UmaError::storage("disk full");
        assert_eq!(err.to_string(), "storage error: disk full");
        assert!(!err.is_timeout());
    }

    #[test]
    fn adapter_type_round_trip() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Retrieval,
            AdapterType::History,
            AdapterType::Generation,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_vector_backend<T: VectorBackend>() {}
        fn _assert_history_store<T: HistoryStore>() {}
        fn _assert_generation_service<T: GenerationService>() {}
        fn _assert_interest_extractor<T: InterestExtractor>() {}
    }
}
