// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-only record types.
//!
//! Turns and profiles are defined in `uma-core` because they cross trait
//! boundaries; the types here are only produced by this crate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uma_core::Metadata;

pub use uma_core::{ConversationTurn, UserProfile};

/// Aggregate counters over one user's conversation log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnStatistics {
    pub total_turns: u64,
    pub user_turns: u64,
    pub assistant_turns: u64,
    pub sessions: u64,
    /// Assistant turns recorded as fallbacks after a failure.
    pub error_turns: u64,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
}

/// A document stored in a searchable collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: i64,
    pub collection: String,
    pub content: String,
    pub metadata: Metadata,
}
