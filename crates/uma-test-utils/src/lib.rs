// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Uma integration tests.
//!
//! - [`MockBackend`] - retrieval backend with scripted hits, delay and failure
//! - [`MockGenerator`] - generation service with queued replies
//! - [`InMemoryHistoryStore`] - history store with switchable failures

pub mod memory_store;
pub mod mock_backend;
pub mod mock_generator;

pub use memory_store::InMemoryHistoryStore;
pub use mock_backend::MockBackend;
pub use mock_generator::MockGenerator;
