// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: backend weights, the dedup
//! threshold range, non-empty paths and positive budgets.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{BackendKind, UmaConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &UmaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    validate_retrieval(config, &mut errors);

    if config.context.budget_chars == 0 {
        errors.push(ConfigError::validation(
            "context.budget_chars must be greater than 0",
        ));
    }

    if config.generation.timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "generation.timeout_ms must be greater than 0",
        ));
    }

    if config.orchestrator.request_timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "orchestrator.request_timeout_ms must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_retrieval(config: &UmaConfig, errors: &mut Vec<ConfigError>) {
    let retrieval = &config.retrieval;

    if retrieval.top_k == 0 {
        errors.push(ConfigError::validation(
            "retrieval.top_k must be greater than 0",
        ));
    }

    if retrieval.timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "retrieval.timeout_ms must be greater than 0",
        ));
    }

    let threshold = retrieval.dedup_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        errors.push(ConfigError::validation(format!(
            "retrieval.dedup_threshold must be in (0, 1], got {threshold}"
        )));
    }

    if retrieval.max_concurrent_searches == 0 {
        errors.push(ConfigError::validation(
            "retrieval.max_concurrent_searches must be at least 1",
        ));
    }

    if retrieval.backends.is_empty() {
        errors.push(ConfigError::validation(
            "at least one [[retrieval.backends]] entry is required",
        ));
    }

    let mut seen = HashSet::new();
    for (i, backend) in retrieval.backends.iter().enumerate() {
        if backend.name.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "retrieval.backends[{i}].name must not be empty"
            )));
        } else if !seen.insert(backend.name.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate backend name `{}` in [[retrieval.backends]]",
                backend.name
            )));
        }

        if !(backend.weight.is_finite() && backend.weight > 0.0) {
            errors.push(ConfigError::validation(format!(
                "retrieval.backends[{i}].weight must be a positive finite number, got {}",
                backend.weight
            )));
        }

        match backend.kind {
            BackendKind::Http => {
                if backend.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                    errors.push(ConfigError::validation(format!(
                        "retrieval.backends[{i}] (`{}`) is an http backend and needs a url",
                        backend.name
                    )));
                }
            }
            BackendKind::Fts => {
                if backend.database_path.trim().is_empty() {
                    errors.push(ConfigError::validation(format!(
                        "retrieval.backends[{i}].database_path must not be empty"
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BackendConfig;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    fn http_backend(name: &str, weight: f64, url: Option<&str>) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            kind: BackendKind::Http,
            weight,
            url: url.map(str::to_string),
            database_path: "docs.db".to_string(),
            collection: "documents".to_string(),
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&UmaConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = UmaConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "storage.database_path"));
    }

    #[test]
    fn threshold_outside_unit_interval_fails() {
        let mut config = UmaConfig::default();
        config.retrieval.dedup_threshold = 0.0;
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "dedup_threshold"
        ));

        config.retrieval.dedup_threshold = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_positive_or_nan_weight_fails() {
        let mut config = UmaConfig::default();
        config.retrieval.backends[0].weight = 0.0;
        config.retrieval.backends[1].weight = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "backends[0].weight"));
        assert!(has_message(&errors, "backends[1].weight"));
    }

    #[test]
    fn no_backends_fails() {
        let mut config = UmaConfig::default();
        config.retrieval.backends.clear();
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "at least one"
        ));
    }

    #[test]
    fn duplicate_backend_names_fail() {
        let mut config = UmaConfig::default();
        config.retrieval.backends = vec![
            http_backend("web", 1.0, Some("http://a/search")),
            http_backend("web", 1.0, Some("http://b/search")),
        ];
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "duplicate backend name `web`"
        ));
    }

    #[test]
    fn http_backend_without_url_fails() {
        let mut config = UmaConfig::default();
        config.retrieval.backends.push(http_backend("remote", 0.5, None));
        assert!(has_message(
            &validate_config(&config).unwrap_err(),
            "needs a url"
        ));
    }

    #[test]
    fn zero_budget_and_bad_log_level_are_both_reported() {
        let mut config = UmaConfig::default();
        config.context.budget_chars = 0;
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
