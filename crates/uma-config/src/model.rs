// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Uma assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Uma configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UmaConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// History store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Merge engine and backend settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context assembler settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-request deadlines.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reply sent when the generation service fails.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    /// Inline system prompt handed to the generation service.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            fallback_message: default_fallback_message(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_agent_name() -> String {
    "uma".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_message() -> String {
    "Sorry, I couldn't put an answer together just now. Please try again in a moment."
        .to_string()
}

fn default_system_prompt() -> String {
    "You are a friendly assistant. Use the user's profile, the recent conversation and the \
     retrieved evidence to give a personal, concise answer. Keep dates, times and places exact."
        .to_string()
}

/// History store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding turns and profiles.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    data_file("uma.db")
}

fn default_documents_path() -> String {
    data_file("documents.db")
}

fn data_file(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("uma").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Which concrete implementation serves a retrieval backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local SQLite FTS5 document collection.
    Fts,
    /// Remote JSON search endpoint.
    Http,
}

/// One retrieval backend taking part in the merge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Unique backend name, used in logs and document provenance.
    pub name: String,

    pub kind: BackendKind,

    /// Relative weight of this backend's normalized scores.
    pub weight: f64,

    /// Search endpoint (http backends).
    #[serde(default)]
    pub url: Option<String>,

    /// Document database (fts backends).
    #[serde(default = "default_documents_path")]
    pub database_path: String,

    /// Collection within the document database (fts backends).
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    "documents".to_string()
}

/// Merge engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum number of merged documents.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-backend search timeout in milliseconds.
    #[serde(default = "default_retrieval_timeout_ms")]
    pub timeout_ms: u64,

    /// Token-Jaccard similarity at or above which two documents are duplicates.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// Upper bound on backend searches in flight across all requests.
    #[serde(default = "default_max_concurrent_searches")]
    pub max_concurrent_searches: usize,

    /// Backends in priority order; the first one is the primary.
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            timeout_ms: default_retrieval_timeout_ms(),
            dedup_threshold: default_dedup_threshold(),
            max_concurrent_searches: default_max_concurrent_searches(),
            backends: default_backends(),
        }
    }
}

fn default_top_k() -> usize {
    10
}

fn default_retrieval_timeout_ms() -> u64 {
    30_000
}

fn default_dedup_threshold() -> f64 {
    0.85
}

fn default_max_concurrent_searches() -> usize {
    8
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig {
            name: "primary".to_string(),
            kind: BackendKind::Fts,
            weight: 0.6,
            url: None,
            database_path: default_documents_path(),
            collection: "documents".to_string(),
        },
        BackendConfig {
            name: "secondary".to_string(),
            kind: BackendKind::Fts,
            weight: 0.4,
            url: None,
            database_path: default_documents_path(),
            collection: "notes".to_string(),
        },
    ]
}

/// Context assembler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Number of recent turns included in the prompt.
    #[serde(default = "default_turn_window")]
    pub turn_window: usize,

    /// Upper bound on the assembled prompt, in characters.
    #[serde(default = "default_budget_chars")]
    pub budget_chars: usize,

    /// Number of profile interests shown in the summary.
    #[serde(default = "default_profile_interests")]
    pub profile_interests: usize,

    /// Per-document cap on evidence text, in characters.
    #[serde(default = "default_evidence_chars")]
    pub evidence_chars: usize,

    /// Upper bound on interests kept in a stored profile.
    #[serde(default = "default_max_interests")]
    pub max_interests: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            turn_window: default_turn_window(),
            budget_chars: default_budget_chars(),
            profile_interests: default_profile_interests(),
            evidence_chars: default_evidence_chars(),
            max_interests: default_max_interests(),
        }
    }
}

fn default_turn_window() -> usize {
    6
}

fn default_budget_chars() -> usize {
    4_000
}

fn default_profile_interests() -> usize {
    5
}

fn default_evidence_chars() -> usize {
    500
}

fn default_max_interests() -> usize {
    10
}

/// Generation service configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// API base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. `None` requires the `UMA_GENERATION_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Generation timeout in milliseconds.
    #[serde(default = "default_generation_timeout_ms")]
    pub timeout_ms: u64,
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_generation_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.3
}

fn default_generation_timeout_ms() -> u64 {
    30_000
}

/// Request-level deadlines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Outer deadline for retrieval, assembly and generation together.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Timeout for each history store read or write.
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,
}

impl OrchestratorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            history_timeout_ms: default_history_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_history_timeout_ms() -> u64 {
    5_000
}
