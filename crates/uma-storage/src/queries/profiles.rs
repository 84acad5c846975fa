// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile operations.

use chrono::SecondsFormat;
use rusqlite::{params, OptionalExtension};
use uma_core::{ProfileDelta, UmaError, UserProfile};

use crate::database::{map_tr_err, Database};
use crate::queries::parse_timestamp;

fn load(conn: &rusqlite::Connection, user_id: &str) -> rusqlite::Result<Option<UserProfile>> {
    conn.query_row(
        "SELECT user_id, interests, turn_count, last_interaction
         FROM user_profiles WHERE user_id = ?1",
        params![user_id],
        |row| {
            let interests: String = row.get(1)?;
            let interests: Vec<String> = serde_json::from_str(&interests).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            let last: Option<String> = row.get(3)?;
            Ok(UserProfile {
                user_id: row.get(0)?,
                interests,
                turn_count: row.get::<_, i64>(2)? as u64,
                last_interaction: last.as_deref().map(|s| parse_timestamp(3, s)).transpose()?,
            })
        },
    )
    .optional()
}

/// Fetch a profile, `None` if the user has never been seen.
pub async fn get_profile(db: &Database, user_id: &str) -> Result<Option<UserProfile>, UmaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<UserProfile>, rusqlite::Error> { load(conn, &user_id) })
        .await
        .map_err(map_tr_err)
}

/// Apply a delta to a profile inside one transaction, creating the row if needed.
pub async fn update_profile(
    db: &Database,
    user_id: &str,
    delta: &ProfileDelta,
) -> Result<UserProfile, UmaError> {
    let user_id = user_id.to_string();
    let delta = delta.clone();
    db.connection()
        .call(move |conn| -> Result<UserProfile, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut profile = load(&tx, &user_id)?.unwrap_or_else(|| UserProfile::empty(&user_id));
            profile.apply(&delta);

            let interests = serde_json::to_string(&profile.interests)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            let last = profile
                .last_interaction
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Nanos, true));
            tx.execute(
                "INSERT INTO user_profiles (user_id, interests, turn_count, last_interaction)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                    interests = excluded.interests,
                    turn_count = excluded.turn_count,
                    last_interaction = excluded.last_interaction,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, interests, profile.turn_count as i64, last],
            )?;
            tx.commit()?;
            Ok(profile)
        })
        .await
        .map_err(map_tr_err)
}
