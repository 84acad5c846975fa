// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request state machine.
//!
//! Each request goes through states: Received -> Classified -> Retrieving ->
//! Assembling -> Generating -> Persisting -> Done. A generation failure moves
//! the request to Failed; the fallback answer is still persisted.

use serde::Serialize;
use tracing::{debug, warn};

/// States in the request FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    Classified,
    Retrieving,
    Assembling,
    Generating,
    Persisting,
    Done,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Done | RequestState::Failed)
    }

    /// Whether `next` directly follows `self`.
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Received, Classified)
                | (Classified, Retrieving)
                | (Classified, Assembling)
                | (Retrieving, Assembling)
                | (Assembling, Generating)
                | (Generating, Persisting)
                | (Persisting, Done)
                | (Received | Classified | Retrieving | Assembling | Generating, Failed)
        )
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestState::Received => write!(f, "received"),
            RequestState::Classified => write!(f, "classified"),
            RequestState::Retrieving => write!(f, "retrieving"),
            RequestState::Assembling => write!(f, "assembling"),
            RequestState::Generating => write!(f, "generating"),
            RequestState::Persisting => write!(f, "persisting"),
            RequestState::Done => write!(f, "done"),
            RequestState::Failed => write!(f, "failed"),
        }
    }
}

/// Current state plus the path taken to reach it.
#[derive(Debug, Clone)]
pub struct StateTracker {
    user_id: String,
    path: Vec<RequestState>,
}

impl StateTracker {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            path: vec![RequestState::Received],
        }
    }

    pub fn state(&self) -> RequestState {
        self.path.last().copied().unwrap_or(RequestState::Received)
    }

    /// Every state visited, in order.
    pub fn path(&self) -> &[RequestState] {
        &self.path
    }

    pub fn advance(&mut self, next: RequestState) {
        let current = self.state();
        if current.is_terminal() {
            debug!(user_id = %self.user_id, state = %current, ignored = %next, "request already finished");
            return;
        }
        if !current.can_transition_to(next) {
            warn!(user_id = %self.user_id, from = %current, to = %next, "unexpected request state transition");
        }
        debug!(user_id = %self.user_id, from = %current, to = %next, "request state transition");
        self.path.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        use RequestState::*;
        let path = [Received, Classified, Retrieving, Assembling, Generating, Persisting, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn retrieval_can_be_skipped() {
        assert!(RequestState::Classified.can_transition_to(RequestState::Assembling));
        assert!(!RequestState::Received.can_transition_to(RequestState::Generating));
    }

    #[test]
    fn terminal_states_stay_put() {
        let mut tracker = StateTracker::new("u1");
        tracker.advance(RequestState::Classified);
        tracker.advance(RequestState::Failed);
        tracker.advance(RequestState::Persisting);
        assert_eq!(tracker.state(), RequestState::Failed);
        assert_eq!(tracker.path().len(), 3);
    }

    #[test]
    fn display_and_serialize_agree() {
        let json = serde_json::to_string(&RequestState::Generating).unwrap();
        assert_eq!(json, format!("\"{}\"", RequestState::Generating));
    }
}
