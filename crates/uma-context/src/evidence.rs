// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evidence zone: time-window filtering and rendering of merged matches.

use uma_core::DocumentMatch;
use uma_router::{TimeWindow, parse_timestamp};

/// Metadata key holding a document's timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Keeps matches whose timestamp falls inside `window`.
///
/// Matches without a parseable timestamp are kept. Returns the kept matches
/// in their original order and the number dropped.
pub fn filter_by_window<'a>(
    matches: &'a [DocumentMatch],
    window: Option<&TimeWindow>,
) -> (Vec<&'a DocumentMatch>, usize) {
    let Some(window) = window else {
        return (matches.iter().collect(), 0);
    };

    let kept: Vec<&DocumentMatch> = matches
        .iter()
        .filter(|m| match document_timestamp(m) {
            Some(ts) => window.contains(ts),
            None => true,
        })
        .collect();
    let dropped = matches.len() - kept.len();
    (kept, dropped)
}

fn document_timestamp(m: &DocumentMatch) -> Option<chrono::DateTime<chrono::Utc>> {
    m.metadata
        .get(TIMESTAMP_KEY)
        .and_then(|v| v.as_str())
        .and_then(parse_timestamp)
}

/// Renders one evidence line, capping the content at `max_chars` characters.
pub fn render_match(position: usize, m: &DocumentMatch, max_chars: usize) -> String {
    let mut line = format!("{position}. [{}] {}", m.source_backend, truncate_chars(&m.content, max_chars));

    let author = m.metadata.get("user").and_then(|v| v.as_str());
    let stamp = m.metadata.get(TIMESTAMP_KEY).and_then(|v| v.as_str());
    match (author, stamp) {
        (Some(a), Some(t)) => line.push_str(&format!(" ({a}, {t})")),
        (Some(a), None) => line.push_str(&format!(" ({a})")),
        (None, Some(t)) => line.push_str(&format!(" ({t})")),
        (None, None) => {}
    }
    line
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
