// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History store trait for conversation turns and learned user profiles.

use async_trait::async_trait;

use crate::error::UmaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationTurn, ProfileDelta, UserProfile};

/// Persists per-user conversation turns and profiles.
///
/// Turns are append-only: every call to [`append_turn`](Self::append_turn)
/// inserts a new row, so concurrent writes for the same user never overwrite
/// each other. Ordering follows the store's insertion order.
#[async_trait]
pub trait HistoryStore: PluginAdapter {
    /// Appends one turn to the user's log.
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), UmaError>;

    /// Returns at most `n` of the user's most recent turns in chronological order.
    async fn recent_turns(
        &self,
        user_id: &str,
        n: usize,
    ) -> Result<Vec<ConversationTurn>, UmaError>;

    /// Returns the user's profile, or `None` before the first interaction.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, UmaError>;

    /// Applies `delta` to the user's profile, creating it when absent.
    async fn update_profile(
        &self,
        user_id: &str,
        delta: &ProfileDelta,
    ) -> Result<UserProfile, UmaError>;
}
