// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the retrieval, history, context and agent crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Free-form metadata attached to documents and conversation turns.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Retrieval,
    History,
    Generation,
}

// --- Retrieval ---

/// A single hit as returned by a retrieval backend.
///
/// `score` is a similarity: higher means more relevant. Backends whose native
/// metric is a distance must convert before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            score,
            metadata: Metadata::new(),
        }
    }

    /// Builder-style helper to attach one metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A backend hit after normalization and weighting by the merge engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMatch {
    pub content: String,
    /// Name of the backend that produced this match.
    pub source_backend: String,
    /// Registration index of the backend; 0 is the primary backend.
    pub backend_index: usize,
    /// Zero-based position within the backend's own result batch.
    pub backend_rank: usize,
    pub raw_score: f64,
    /// Min-max normalized score within the backend's batch, in [0, 1].
    pub batch_score: f64,
    /// `batch_score` multiplied by the backend's effective weight. Merged
    /// results are ordered by this score.
    pub normalized_score: f64,
    pub metadata: Metadata,
}

// --- History ---

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a user's append-only conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Learned summary of a user, updated incrementally after every exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    /// Interests ordered from least to most recently mentioned.
    pub interests: Vec<String>,
    pub turn_count: u64,
    pub last_interaction: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// An empty profile for a user that has never interacted.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            interests: Vec::new(),
            turn_count: 0,
            last_interaction: None,
        }
    }

    /// Applies a delta in place.
    ///
    /// New interests are appended (or moved to the end when already known) and
    /// the list is trimmed from the front to `delta.max_interests`.
    pub fn apply(&mut self, delta: &ProfileDelta) {
        for interest in &delta.interests {
            self.interests.retain(|known| known != interest);
            self.interests.push(interest.clone());
        }
        if delta.max_interests > 0 && self.interests.len() > delta.max_interests {
            let excess = self.interests.len() - delta.max_interests;
            self.interests.drain(..excess);
        }
        self.turn_count += delta.turn_increment;
        self.last_interaction = Some(delta.interaction_at);
    }

    /// The `n` most recent interests, most recent first.
    pub fn top_interests(&self, n: usize) -> Vec<&str> {
        self.interests.iter().rev().take(n).map(String::as_str).collect()
    }
}

/// Incremental profile update produced after one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDelta {
    pub interests: Vec<String>,
    pub turn_increment: u64,
    pub interaction_at: DateTime<Utc>,
    /// Upper bound on the stored interest list; 0 disables the bound.
    pub max_interests: usize,
}

// --- Generation ---

/// Parameters forwarded to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// System instruction sent ahead of the assembled context.
    pub system_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(interests: &[&str], max: usize) -> ProfileDelta {
        ProfileDelta {
            interests: interests.iter().map(|s| s.to_string()).collect(),
            turn_increment: 1,
            interaction_at: Utc::now(),
            max_interests: max,
        }
    }

    #[test]
    fn role_display_and_parse() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn apply_appends_interest_and_counts_turn() {
        let mut profile = UserProfile::empty("u1");
        profile.interests.push("running".into());
        profile.apply(&delta(&["marathon"], 10));
        assert_eq!(profile.interests, vec!["running", "marathon"]);
        assert_eq!(profile.turn_count, 1);
        assert!(profile.last_interaction.is_some());
    }

    #[test]
    fn apply_refreshes_recency_without_duplicates() {
        let mut profile = UserProfile::empty("u1");
        profile.apply(&delta(&["running", "cycling"], 10));
        profile.apply(&delta(&["running"], 10));
        assert_eq!(profile.interests, vec!["cycling", "running"]);
        assert_eq!(profile.turn_count, 2);
    }

    #[test]
    fn apply_bounds_interest_list() {
        let mut profile = UserProfile::empty("u1");
        profile.apply(&delta(&["a1", "b2", "c3", "d4"], 3));
        assert_eq!(profile.interests, vec!["b2", "c3", "d4"]);
    }

    #[test]
    fn top_interests_most_recent_first() {
        let mut profile = UserProfile::empty("u1");
        profile.apply(&delta(&["golf", "tennis", "chess"], 10));
        assert_eq!(profile.top_interests(2), vec!["chess", "tennis"]);
    }

    #[test]
    fn search_hit_deserializes_without_metadata() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"content":"match day","score":0.4}"#).unwrap();
        assert_eq!(hit.content, "match day");
        assert!(hit.metadata.is_empty());
    }
}
