// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query type classification.
//!
//! Decides whether a query is bounded in time, asks about the user's own
//! profile, or is a general question. Pure string matching, no network.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::time_window::{TimeWindow, infer_window};

/// Query types the orchestrator handles differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Refers to a time window; evidence outside it is filtered out.
    TimeScoped(TimeWindow),
    /// About the user themself; answered from profile and history only.
    ProfileOnly,
    /// Everything else.
    General,
}

impl QueryKind {
    /// Stable label used as the response type in response metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::TimeScoped(_) => "time_scoped",
            QueryKind::ProfileOnly => "profile_only",
            QueryKind::General => "general",
        }
    }

    pub fn window(&self) -> Option<&TimeWindow> {
        match self {
            QueryKind::TimeScoped(window) => Some(window),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a query.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub kind: QueryKind,
    /// Human-readable reason for the classification.
    pub reason: &'static str,
}

/// Phrases asking about the user (contains, case-insensitive).
const PROFILE_PHRASES: &[&str] = &[
    "what do you know about me",
    "what do you remember about me",
    "tell me about myself",
    "my interests",
    "my profile",
    "what am i interested in",
    "what do i like",
    "私について",
    "私のこと",
    "私の興味",
    "僕について",
];

/// Heuristic query classifier.
pub struct QueryClassifier {
    profile_phrases: Vec<String>,
}

impl QueryClassifier {
    pub fn new() -> Self {
        Self {
            profile_phrases: PROFILE_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Adds extra profile phrases on top of the built-in ones.
    pub fn with_profile_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile_phrases
            .extend(phrases.into_iter().map(|p| p.into().to_lowercase()));
        self
    }

    /// Classify against the current time.
    pub fn classify(&self, query: &str) -> ClassificationResult {
        self.classify_at(query, Utc::now())
    }

    /// Classify with time windows computed relative to `now`.
    pub fn classify_at(&self, query: &str, now: DateTime<Utc>) -> ClassificationResult {
        let trimmed = query.trim();
        let result = if trimmed.is_empty() {
            ClassificationResult {
                kind: QueryKind::General,
                reason: "empty query",
            }
        } else if let Some(window) = infer_window(trimmed, now) {
            ClassificationResult {
                kind: QueryKind::TimeScoped(window),
                reason: "time expression",
            }
        } else if self.is_profile_query(trimmed) {
            ClassificationResult {
                kind: QueryKind::ProfileOnly,
                reason: "question about the user",
            }
        } else {
            ClassificationResult {
                kind: QueryKind::General,
                reason: "no specific indicators",
            }
        };

        debug!(kind = %result.kind, reason = result.reason, "query classified");
        result
    }

    fn is_profile_query(&self, query: &str) -> bool {
        let lower = query.to_lowercase();
        self.profile_phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
