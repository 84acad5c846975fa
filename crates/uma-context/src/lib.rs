// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for Uma prompts.
//!
//! Builds one bounded text block from four zones:
//! - **Profile**: what is known about the user (interests, turn count)
//! - **History**: the most recent conversation turns, oldest first
//! - **Evidence**: merged retrieval matches, filtered to the query's time window
//! - **Query**: the current question, never truncated
//!
//! History store reads are time-bounded; a failed or slow read leaves its
//! zone empty instead of failing the request.

pub mod budget;
pub mod evidence;
pub mod profile;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uma_config::model::ContextConfig;
use uma_core::{ConversationTurn, HistoryStore, UmaError, UserProfile};
use uma_retrieval::MergedResultSet;
use uma_router::{QueryClassifier, QueryKind};

pub use budget::{Fitted, Sections, fit_to_budget};
pub use evidence::{TIMESTAMP_KEY, filter_by_window};
pub use profile::summarize_profile;

/// Assembler settings that do not change per request.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Number of interests shown in the profile zone.
    pub profile_interests: usize,
    /// Per-document cap on evidence text, in characters.
    pub evidence_chars: usize,
    /// Timeout for each history store read.
    pub history_timeout: Duration,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self::from(&ContextConfig::default())
    }
}

impl From<&ContextConfig> for AssemblerOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            profile_interests: config.profile_interests,
            evidence_chars: config.evidence_chars,
            history_timeout: Duration::from_secs(5),
        }
    }
}

/// Counters describing what went into a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextStats {
    pub profile_included: bool,
    pub history_turns: usize,
    pub evidence_count: usize,
    /// Evidence dropped because its timestamp fell outside the query window.
    pub evidence_filtered: usize,
    /// Entries removed to meet the character budget.
    pub truncated_entries: usize,
}

/// The bounded prompt handed to the generation service.
#[derive(Debug, Clone)]
pub struct ContextPayload {
    pub text: String,
    pub kind: QueryKind,
    pub stats: ContextStats,
    /// Set when the query alone exceeds the budget; `text` is then the bare query.
    pub over_budget: bool,
}

impl ContextPayload {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters, the unit the budget is expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl std::fmt::Display for ContextPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Combines profile, history and evidence into a [`ContextPayload`].
pub struct ContextAssembler {
    store: Arc<dyn HistoryStore>,
    classifier: QueryClassifier,
    options: AssemblerOptions,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn HistoryStore>, options: AssemblerOptions) -> Self {
        Self {
            store,
            classifier: QueryClassifier::new(),
            options,
        }
    }

    /// Replaces the classifier used to detect time-scoped queries.
    pub fn with_classifier(mut self, classifier: QueryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Assembles a payload, classifying the query against the current time.
    pub async fn assemble(
        &self,
        user_id: &str,
        query: &str,
        merged: &MergedResultSet,
        turn_window: usize,
        budget_chars: usize,
    ) -> ContextPayload {
        self.assemble_at(user_id, query, merged, turn_window, budget_chars, Utc::now())
            .await
    }

    /// Assembles a payload, classifying the query relative to `now`.
    pub async fn assemble_at(
        &self,
        user_id: &str,
        query: &str,
        merged: &MergedResultSet,
        turn_window: usize,
        budget_chars: usize,
        now: DateTime<Utc>,
    ) -> ContextPayload {
        let kind = self.classifier.classify_at(query, now).kind;
        self.assemble_classified(user_id, query, &kind, merged, turn_window, budget_chars)
            .await
    }

    /// Assembles a payload for a query that has already been classified.
    pub async fn assemble_classified(
        &self,
        user_id: &str,
        query: &str,
        kind: &QueryKind,
        merged: &MergedResultSet,
        turn_window: usize,
        budget_chars: usize,
    ) -> ContextPayload {
        let (turns, profile) = tokio::join!(
            self.load_turns(user_id, turn_window),
            self.load_profile(user_id)
        );

        let (kept, evidence_filtered) = filter_by_window(&merged.matches, kind.window());
        let sections = Sections {
            profile: profile
                .as_ref()
                .and_then(|p| summarize_profile(p, self.options.profile_interests)),
            history: turns.iter().map(profile::render_turn).collect(),
            evidence: kept
                .iter()
                .enumerate()
                .map(|(i, m)| evidence::render_match(i + 1, m, self.options.evidence_chars))
                .collect(),
        };

        let fitted = fit_to_budget(&sections, query, budget_chars);
        if fitted.over_budget {
            warn!(
                user_id,
                query_chars = query.chars().count(),
                budget_chars,
                "query alone exceeds the context budget"
            );
        }

        let stats = ContextStats {
            profile_included: fitted.profile_included,
            history_turns: fitted.history_kept,
            evidence_count: fitted.evidence_kept,
            evidence_filtered,
            truncated_entries: fitted.removed,
        };
        debug!(
            user_id,
            kind = %kind,
            chars = fitted.text.chars().count(),
            history_turns = stats.history_turns,
            evidence_count = stats.evidence_count,
            evidence_filtered = stats.evidence_filtered,
            truncated = stats.truncated_entries,
            "context assembled"
        );

        ContextPayload {
            text: fitted.text,
            kind: *kind,
            stats,
            over_budget: fitted.over_budget,
        }
    }

    async fn load_turns(&self, user_id: &str, turn_window: usize) -> Vec<ConversationTurn> {
        if turn_window == 0 {
            return Vec::new();
        }
        let read = self.store.recent_turns(user_id, turn_window);
        match bounded(read, self.options.history_timeout).await {
            Ok(mut turns) => {
                // Guard against stores that return more than asked.
                if turns.len() > turn_window {
                    turns.drain(..turns.len() - turn_window);
                }
                turns
            }
            Err(e) => {
                warn!(user_id, error = %e, "history read failed, assembling without history");
                Vec::new()
            }
        }
    }

    async fn load_profile(&self, user_id: &str) -> Option<UserProfile> {
        match bounded(self.store.get_profile(user_id), self.options.history_timeout).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id, error = %e, "profile read failed, assembling without profile");
                None
            }
        }
    }
}

async fn bounded<T>(
    fut: impl std::future::Future<Output = Result<T, UmaError>>,
    duration: Duration,
) -> Result<T, UmaError> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| UmaError::Timeout { duration })?
}
