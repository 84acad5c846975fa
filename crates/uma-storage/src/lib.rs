// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Uma assistant.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer model via
//! `tokio-rusqlite`. Holds the append-only conversation log, learned user
//! profiles, and the document collections searched by the local backend.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteHistoryStore;
pub use database::Database;
pub use models::{StoredDocument, TurnStatistics};
