// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! What the orchestrator hands back to front-ends.

use serde::Serialize;
use uma_retrieval::RetrievalAvailability;

use crate::state::RequestState;

/// Final answer plus structured metadata for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub text: String,
    pub metadata: ResponseMetadata,
}

impl AgentResponse {
    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    /// `time_scoped`, `profile_only` or `general`.
    pub response_type: &'static str,
    /// The generation service failed and the canned reply was used.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub evidence_count: usize,
    /// Evidence dropped by the query's time window.
    pub evidence_filtered: usize,
    pub history_turns: usize,
    pub profile_used: bool,
    /// `None` when retrieval was skipped or never finished.
    pub retrieval: Option<RetrievalAvailability>,
    /// Prompt length in characters.
    pub prompt_length: usize,
    pub over_budget: bool,
    /// Both turns and the profile update were stored.
    pub persisted: bool,
    pub final_state: RequestState,
    pub elapsed_ms: u64,
}

impl ResponseMetadata {
    pub(crate) fn new(response_type: &'static str) -> Self {
        Self {
            response_type,
            fallback: false,
            error_message: None,
            evidence_count: 0,
            evidence_filtered: 0,
            history_turns: 0,
            profile_used: false,
            retrieval: None,
            prompt_length: 0,
            over_budget: false,
            persisted: false,
            final_state: RequestState::Received,
            elapsed_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_for_front_ends() {
        let mut metadata = ResponseMetadata::new("time_scoped");
        metadata.retrieval = Some(RetrievalAvailability::Degraded {
            failed: vec!["secondary".into()],
        });
        metadata.final_state = RequestState::Done;

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["response_type"], "time_scoped");
        assert_eq!(json["retrieval"]["status"], "degraded");
        assert_eq!(json["final_state"], "done");
        assert!(json.get("error_message").is_none());
    }
}
