// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the stored entities.

pub mod documents;
pub mod profiles;
pub mod turns;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use uma_core::Metadata;

/// Parse an RFC 3339 column value, reporting failures as a conversion error.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse an optional JSON object column; NULL becomes empty metadata.
pub(crate) fn parse_metadata(idx: usize, value: Option<String>) -> rusqlite::Result<Metadata> {
    match value {
        None => Ok(Metadata::new()),
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

/// Serialize metadata for storage; empty metadata is stored as NULL.
pub(crate) fn metadata_to_sql(metadata: &Metadata) -> Option<String> {
    if metadata.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(metadata.clone()).to_string())
    }
}
