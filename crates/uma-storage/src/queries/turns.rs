// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn operations.

use chrono::SecondsFormat;
use rusqlite::params;
use uma_core::{ConversationTurn, Role, UmaError};

use crate::database::{map_tr_err, Database};
use crate::models::TurnStatistics;
use crate::queries::{metadata_to_sql, parse_metadata, parse_timestamp};

const TURN_COLUMNS: &str = "user_id, session_id, role, content, metadata, created_at";

fn row_to_turn(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationTurn> {
    let role: String = row.get(2)?;
    let role = role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(5)?;
    Ok(ConversationTurn {
        user_id: row.get(0)?,
        session_id: row.get(1)?,
        role,
        content: row.get(3)?,
        metadata: parse_metadata(4, row.get(4)?)?,
        timestamp: parse_timestamp(5, &created_at)?,
    })
}

/// Append one turn. Every call inserts a new row.
pub async fn append_turn(db: &Database, turn: &ConversationTurn) -> Result<(), UmaError> {
    let turn = turn.clone();
    let metadata = metadata_to_sql(&turn.metadata);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversation_turns (user_id, session_id, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    turn.user_id,
                    turn.session_id,
                    turn.role.to_string(),
                    turn.content,
                    metadata,
                    turn.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The user's `n` most recent turns, oldest first.
pub async fn recent_turns(
    db: &Database,
    user_id: &str,
    n: usize,
) -> Result<Vec<ConversationTurn>, UmaError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let user_id = user_id.to_string();
    let mut turns = db
        .connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM conversation_turns
                 WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(params![user_id, n as i64], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    turns.reverse();
    Ok(turns)
}

/// Turns of one user whose content contains `needle`, newest first.
pub async fn search_turns(
    db: &Database,
    user_id: &str,
    needle: &str,
    limit: usize,
) -> Result<Vec<ConversationTurn>, UmaError> {
    let user_id = user_id.to_string();
    let pattern = format!("%{}%", escape_like(needle));
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM conversation_turns
                 WHERE user_id = ?1 AND content LIKE ?2 ESCAPE '\\'
                 ORDER BY id DESC LIMIT ?3"
            ))?;
            let rows = stmt
                .query_map(params![user_id, pattern, limit as i64], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Counters over the user's whole log.
pub async fn statistics(db: &Database, user_id: &str) -> Result<TurnStatistics, UmaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<TurnStatistics, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(role = 'user'), 0),
                        COALESCE(SUM(role = 'assistant'), 0),
                        COUNT(DISTINCT session_id),
                        COALESCE(SUM(json_extract(metadata, '$.error_occurred') = 1), 0),
                        MIN(created_at),
                        MAX(created_at)
                 FROM conversation_turns WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let first: Option<String> = row.get(5)?;
                    let last: Option<String> = row.get(6)?;
                    Ok(TurnStatistics {
                        total_turns: row.get::<_, i64>(0)? as u64,
                        user_turns: row.get::<_, i64>(1)? as u64,
                        assistant_turns: row.get::<_, i64>(2)? as u64,
                        sessions: row.get::<_, i64>(3)? as u64,
                        error_turns: row.get::<_, i64>(4)? as u64,
                        first_at: first.as_deref().map(|s| parse_timestamp(5, s)).transpose()?,
                        last_at: last.as_deref().map(|s| parse_timestamp(6, s)).transpose()?,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn turn(user: &str, role: Role, content: &str) -> ConversationTurn {
        ConversationTurn::new(user, "sess-1", role, content)
    }

    #[tokio::test]
    async fn recent_turns_are_chronological_and_bounded() {
        let db = Database::open_in_memory().await.unwrap();
        for i in 0..5 {
            append_turn(&db, &turn("u1", Role::User, &format!("msg {i}")))
                .await
                .unwrap();
        }

        let turns = recent_turns(&db, "u1", 3).await.unwrap();
        let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn recent_turns_isolated_per_user() {
        let db = Database::open_in_memory().await.unwrap();
        append_turn(&db, &turn("u1", Role::User, "mine")).await.unwrap();
        append_turn(&db, &turn("u2", Role::User, "theirs")).await.unwrap();

        let turns = recent_turns(&db, "u1", 10).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "mine");
        assert!(recent_turns(&db, "nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn identical_turns_are_both_kept() {
        let db = Database::open_in_memory().await.unwrap();
        let t = turn("u1", Role::User, "same words");
        append_turn(&db, &t).await.unwrap();
        append_turn(&db, &t).await.unwrap();
        assert_eq!(recent_turns(&db, "u1", 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn metadata_and_timestamp_round_trip() {
        let db = Database::open_in_memory().await.unwrap();
        let mut t = turn("u1", Role::Assistant, "answer");
        t.metadata
            .insert("error_occurred".into(), serde_json::Value::Bool(true));
        t.timestamp = Utc::now() - Duration::hours(3);
        append_turn(&db, &t).await.unwrap();

        let stored = recent_turns(&db, "u1", 1).await.unwrap().remove(0);
        assert_eq!(stored.role, Role::Assistant);
        assert_eq!(stored.metadata.get("error_occurred"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(stored.timestamp, t.timestamp);
    }

    #[tokio::test]
    async fn search_matches_substring_and_escapes_wildcards() {
        let db = Database::open_in_memory().await.unwrap();
        append_turn(&db, &turn("u1", Role::User, "training for a marathon"))
            .await
            .unwrap();
        append_turn(&db, &turn("u1", Role::User, "100% effort"))
            .await
            .unwrap();

        let hits = search_turns(&db, "u1", "marathon", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = search_turns(&db, "u1", "0%", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "100% effort");
    }

    #[tokio::test]
    async fn statistics_count_roles_sessions_and_errors() {
        let db = Database::open_in_memory().await.unwrap();
        append_turn(&db, &turn("u1", Role::User, "hi")).await.unwrap();
        let mut fallback = turn("u1", Role::Assistant, "sorry");
        fallback
            .metadata
            .insert("error_occurred".into(), serde_json::Value::Bool(true));
        append_turn(&db, &fallback).await.unwrap();
        let mut other = ConversationTurn::new("u1", "sess-2", Role::User, "again");
        other.timestamp = Utc::now() + Duration::seconds(1);
        append_turn(&db, &other).await.unwrap();

        let stats = statistics(&db, "u1").await.unwrap();
        assert_eq!(stats.total_turns, 3);
        assert_eq!(stats.user_turns, 2);
        assert_eq!(stats.assistant_turns, 1);
        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.error_turns, 1);
        assert!(stats.first_at.unwrap() <= stats.last_at.unwrap());
    }

    #[tokio::test]
    async fn statistics_for_unknown_user_are_zero() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(
            statistics(&db, "ghost").await.unwrap(),
            TurnStatistics::default()
        );
    }
}
