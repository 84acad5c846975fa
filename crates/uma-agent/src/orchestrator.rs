// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The response orchestrator drives one request from question to stored answer.
//!
//! Retrieval, assembly and generation share one outer deadline. Any failure
//! in those phases ends in the configured fallback reply instead of an error.
//! Persistence runs afterwards and never changes the answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uma_config::UmaConfig;
use uma_context::{AssemblerOptions, ContextAssembler, filter_by_window};
use uma_core::{
    ConversationTurn, GenerationParams, GenerationService, HealthStatus, HistoryStore,
    InterestExtractor, Metadata, ProfileDelta, Role, UmaError,
};
use uma_retrieval::{MergeEngine, MergedResultSet};
use uma_router::{QueryClassifier, QueryKind};

use crate::interests::KeywordInterestExtractor;
use crate::response::{AgentResponse, ResponseMetadata};
use crate::state::{RequestState, StateTracker};

/// Per-request knobs, usually taken from [`UmaConfig`].
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub top_k: usize,
    pub turn_window: usize,
    pub budget_chars: usize,
    pub max_interests: usize,
    pub fallback_message: String,
    pub generation: GenerationParams,
    pub request_timeout: Duration,
    pub history_timeout: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &UmaConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            turn_window: config.context.turn_window,
            budget_chars: config.context.budget_chars,
            max_interests: config.context.max_interests,
            fallback_message: config.agent.fallback_message.clone(),
            generation: GenerationParams {
                model: config.generation.model.clone(),
                max_tokens: config.generation.max_tokens,
                temperature: config.generation.temperature,
                system_prompt: config.agent.system_prompt.clone(),
            },
            request_timeout: config.orchestrator.request_timeout(),
            history_timeout: config.orchestrator.history_timeout(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&UmaConfig::default())
    }
}

/// Coordinates retrieval, context assembly, generation and persistence.
pub struct ResponseOrchestrator {
    engine: Arc<MergeEngine>,
    assembler: ContextAssembler,
    store: Arc<dyn HistoryStore>,
    generator: Arc<dyn GenerationService>,
    extractor: Arc<dyn InterestExtractor>,
    classifier: QueryClassifier,
    settings: OrchestratorSettings,
}

/// Accumulates metadata while the phases run, so a deadline that drops the
/// phase future still leaves what was learned so far.
struct Draft {
    metadata: ResponseMetadata,
}

impl ResponseOrchestrator {
    pub fn new(
        engine: Arc<MergeEngine>,
        store: Arc<dyn HistoryStore>,
        generator: Arc<dyn GenerationService>,
        assembler_options: AssemblerOptions,
        settings: OrchestratorSettings,
    ) -> Self {
        let assembler_options = AssemblerOptions {
            history_timeout: settings.history_timeout,
            ..assembler_options
        };
        Self {
            engine,
            assembler: ContextAssembler::new(Arc::clone(&store), assembler_options),
            store,
            generator,
            extractor: Arc::new(KeywordInterestExtractor::new()),
            classifier: QueryClassifier::new(),
            settings,
        }
    }

    /// Builds an orchestrator with every knob taken from `config`.
    pub fn from_config(
        config: &UmaConfig,
        engine: Arc<MergeEngine>,
        store: Arc<dyn HistoryStore>,
        generator: Arc<dyn GenerationService>,
    ) -> Self {
        Self::new(
            engine,
            store,
            generator,
            AssemblerOptions::from(&config.context),
            OrchestratorSettings::from_config(config),
        )
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn InterestExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_classifier(mut self, classifier: QueryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Answers `message` for `user_id`, classifying against the current time.
    pub async fn respond(&self, user_id: &str, session_id: &str, message: &str) -> AgentResponse {
        self.respond_at(user_id, session_id, message, Utc::now()).await
    }

    /// Answers `message` with time windows computed relative to `now`.
    pub async fn respond_at(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> AgentResponse {
        let started = Instant::now();
        let mut tracker = StateTracker::new(user_id);

        let kind = self.classifier.classify_at(message, now).kind;
        tracker.advance(RequestState::Classified);

        let mut draft = Draft {
            metadata: ResponseMetadata::new(kind.as_str()),
        };
        let deadline = self.settings.request_timeout;
        let phases = self.produce(user_id, message, &kind, &mut tracker, &mut draft);
        let outcome = tokio::time::timeout(deadline, phases)
            .await
            .unwrap_or(Err(UmaError::Timeout { duration: deadline }));

        let mut metadata = draft.metadata;
        let text = match outcome {
            Ok(answer) => {
                tracker.advance(RequestState::Persisting);
                answer
            }
            Err(e) => {
                warn!(user_id, state = %tracker.state(), error = %e, "answer failed, using fallback reply");
                tracker.advance(RequestState::Failed);
                metadata.fallback = true;
                metadata.error_message = Some(e.to_string());
                self.settings.fallback_message.clone()
            }
        };

        metadata.persisted = self
            .persist(user_id, session_id, message, &text, &kind, &metadata, now)
            .await;
        tracker.advance(RequestState::Done);

        metadata.final_state = tracker.state();
        metadata.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            user_id,
            response_type = metadata.response_type,
            fallback = metadata.fallback,
            evidence = metadata.evidence_count,
            elapsed_ms = metadata.elapsed_ms,
            "request finished"
        );

        AgentResponse { text, metadata }
    }

    /// Retrieving, Assembling and Generating.
    async fn produce(
        &self,
        user_id: &str,
        message: &str,
        kind: &QueryKind,
        tracker: &mut StateTracker,
        draft: &mut Draft,
    ) -> Result<String, UmaError> {
        let (merged, turn_window) = match kind {
            QueryKind::ProfileOnly => (MergedResultSet::empty(), self.settings.turn_window * 2),
            QueryKind::TimeScoped(window) => {
                tracker.advance(RequestState::Retrieving);
                let wide = self
                    .engine
                    .merge_with(message, self.settings.top_k * 2, &[], self.engine.options().timeout)
                    .await;
                let (kept, dropped) = filter_by_window(&wide.matches, Some(window));
                draft.metadata.evidence_filtered = dropped;
                draft.metadata.retrieval = Some(wide.availability.clone());
                let matches = kept
                    .into_iter()
                    .take(self.settings.top_k)
                    .cloned()
                    .collect();
                (
                    MergedResultSet {
                        matches,
                        availability: wide.availability,
                    },
                    self.settings.turn_window,
                )
            }
            QueryKind::General => {
                tracker.advance(RequestState::Retrieving);
                let merged = self
                    .engine
                    .merge_with(message, self.settings.top_k, &[], self.engine.options().timeout)
                    .await;
                draft.metadata.retrieval = Some(merged.availability.clone());
                (merged, self.settings.turn_window)
            }
        };
        if merged.is_unavailable() {
            warn!(user_id, "retrieval unavailable, answering from history and profile");
        }

        tracker.advance(RequestState::Assembling);
        let payload = self
            .assembler
            .assemble_classified(
                user_id,
                message,
                kind,
                &merged,
                turn_window,
                self.settings.budget_chars,
            )
            .await;
        let m = &mut draft.metadata;
        m.evidence_count = payload.stats.evidence_count;
        m.evidence_filtered += payload.stats.evidence_filtered;
        m.history_turns = payload.stats.history_turns;
        m.profile_used = payload.stats.profile_included;
        m.prompt_length = payload.char_len();
        m.over_budget = payload.over_budget;

        tracker.advance(RequestState::Generating);
        let answer = self
            .generator
            .generate(payload.as_str(), &self.settings.generation)
            .await?;
        if answer.trim().is_empty() {
            return Err(UmaError::generation("generation service returned an empty answer"));
        }
        Ok(answer)
    }

    /// Stores both turns and updates the profile. Returns whether all three
    /// writes succeeded; failures are logged only.
    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
        answer: &str,
        kind: &QueryKind,
        metadata: &ResponseMetadata,
        now: DateTime<Utc>,
    ) -> bool {
        let mut user_turn = ConversationTurn::new(user_id, session_id, Role::User, message);
        user_turn
            .metadata
            .insert("response_type".into(), kind.as_str().into());

        let mut assistant_turn = ConversationTurn::new(user_id, session_id, Role::Assistant, answer);
        let meta: &mut Metadata = &mut assistant_turn.metadata;
        meta.insert("response_type".into(), kind.as_str().into());
        meta.insert("error_occurred".into(), metadata.fallback.into());
        meta.insert("evidence_count".into(), metadata.evidence_count.into());
        if let Some(error) = &metadata.error_message {
            meta.insert("error_message".into(), error.clone().into());
        }

        let mut ok = true;
        for turn in [&user_turn, &assistant_turn] {
            if let Err(e) = self.bounded(self.store.append_turn(turn)).await {
                warn!(user_id, role = %turn.role, error = %e, "failed to persist turn");
                ok = false;
            }
        }

        let delta = ProfileDelta {
            interests: self.extractor.extract_interests(message),
            turn_increment: 1,
            interaction_at: now,
            max_interests: self.settings.max_interests,
        };
        if let Err(e) = self.bounded(self.store.update_profile(user_id, &delta)).await {
            warn!(user_id, error = %e, "failed to update profile");
            ok = false;
        }
        ok
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, UmaError>>,
    ) -> Result<T, UmaError> {
        let duration = self.settings.history_timeout;
        tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| UmaError::Timeout { duration })?
    }

    /// Health of every collaborator: backends first, then store and generator.
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        let mut report = self.engine.health().await;
        let (store, generator) =
            tokio::join!(self.store.health_check(), self.generator.health_check());
        for (name, status) in [(self.store.name(), store), (self.generator.name(), generator)] {
            report.push((
                name.to_string(),
                status.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string())),
            ));
        }
        report
    }
}
