// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./uma.toml` > `~/.config/uma/uma.toml` > `/etc/uma/uma.toml`
//! with environment variable overrides via `UMA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::UmaConfig;

/// Config sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "retrieval",
    "context",
    "generation",
    "orchestrator",
];

pub(crate) const SYSTEM_CONFIG: &str = "/etc/uma/uma.toml";
pub(crate) const LOCAL_CONFIG: &str = "uma.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("uma/uma.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/uma/uma.toml` (system-wide)
/// 3. `~/.config/uma/uma.toml` (user XDG config)
/// 4. `./uma.toml` (local directory)
/// 5. `UMA_*` environment variables
pub fn load_config() -> Result<UmaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<UmaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UmaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<UmaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UmaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The layered Figment before extraction, so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(UmaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `UMA_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `UMA_RETRIEVAL_TOP_K` lands on `retrieval.top_k` rather than `retrieval.top.k`.
fn env_provider() -> Env {
    Env::prefixed("UMA_").map(|key| map_env_key(key.as_str()).into())
}

/// Figment hands over the key uppercase, as written in the environment.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("retrieval_top_k"), "retrieval.top_k");
        assert_eq!(
            map_env_key("orchestrator_request_timeout_ms"),
            "orchestrator.request_timeout_ms"
        );
        assert_eq!(map_env_key("generation_api_key"), "generation.api_key");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_keys_are_matched_case_insensitively() {
        assert_eq!(map_env_key("GENERATION_API_KEY"), "generation.api_key");
        assert_eq!(map_env_key("RETRIEVAL_TOP_K"), "retrieval.top_k");
        assert_eq!(map_env_key("Context_Budget_Chars"), "context.budget_chars");
    }
}
