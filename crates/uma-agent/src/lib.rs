// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response orchestration for the Uma assistant.
//!
//! This crate provides:
//! - [`ResponseOrchestrator`]: classify, retrieve, assemble, generate, persist
//! - [`RequestState`]: the per-request state machine
//! - [`KeywordInterestExtractor`]: default profile learning strategy

pub mod interests;
pub mod orchestrator;
pub mod response;
pub mod state;

pub use interests::KeywordInterestExtractor;
pub use orchestrator::{OrchestratorSettings, ResponseOrchestrator};
pub use response::{AgentResponse, ResponseMetadata};
pub use state::{RequestState, StateTracker};
