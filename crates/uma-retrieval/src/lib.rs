// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retrieval for the Uma assistant.
//!
//! The [`MergeEngine`] fans a query out to every registered
//! [`VectorBackend`](uma_core::VectorBackend), normalizes each backend's
//! scores within its own batch, weights them, removes near-duplicates and
//! returns one ranked [`MergedResultSet`]. Backend failures degrade the
//! result instead of failing it.

pub mod builder;
pub mod dedup;
pub mod fts;
pub mod http;
pub mod merge;
pub mod preprocess;
pub mod scoring;

pub use builder::{build_merge_engine, open_fts_backend};
pub use fts::Fts5Backend;
pub use http::HttpSearchBackend;
pub use merge::{MergeEngine, MergeOptions, MergedResultSet, RetrievalAvailability};
pub use preprocess::preprocess_query;
