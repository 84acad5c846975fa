// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators of the response engine.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod extraction;
pub mod generation;
pub mod history;
pub mod retrieval;

pub use adapter::PluginAdapter;
pub use extraction::InterestExtractor;
pub use generation::GenerationService;
pub use history::HistoryStore;
pub use retrieval::VectorBackend;
