// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `uma history` command implementation.

use uma_config::UmaConfig;
use uma_core::{ConversationTurn, HistoryStore, UmaError};
use uma_storage::{SqliteHistoryStore, TurnStatistics};

pub async fn run_history(
    config: &UmaConfig,
    user_id: &str,
    search: Option<&str>,
    limit: usize,
    stats: bool,
) -> Result<(), UmaError> {
    let store = SqliteHistoryStore::open(&config.storage).await?;

    if stats {
        let statistics = store.statistics(user_id).await?;
        let profile = store.get_profile(user_id).await?;
        println!("{}", format_statistics(user_id, &statistics));
        if let Some(profile) = profile
            && !profile.interests.is_empty()
        {
            println!("interests:     {}", profile.top_interests(limit).join(", "));
        }
    } else {
        let turns = match search {
            Some(needle) => store.search_turns(user_id, needle, limit).await?,
            None => store.recent_turns(user_id, limit).await?,
        };
        if turns.is_empty() {
            println!("no turns for `{user_id}`");
        }
        for turn in &turns {
            println!("{}", format_turn(turn));
        }
    }

    store.close().await
}

fn format_turn(turn: &ConversationTurn) -> String {
    let marker = match turn.metadata.get("error_occurred").and_then(|v| v.as_bool()) {
        Some(true) => " (fallback)",
        _ => "",
    };
    format!(
        "{} {:<9} {}{}",
        turn.timestamp.format("%Y-%m-%d %H:%M"),
        turn.role,
        turn.content,
        marker
    )
}

fn format_statistics(user_id: &str, s: &TurnStatistics) -> String {
    let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    [
        format!("user:          {user_id}"),
        format!(
            "turns:         {} ({} user, {} assistant)",
            s.total_turns, s.user_turns, s.assistant_turns
        ),
        format!("sessions:      {}", s.sessions),
        format!("fallbacks:     {}", s.error_turns),
        format!("first:         {}", when(s.first_at)),
        format!("last:          {}", when(s.last_at)),
    ]
    .join("\n")
}
