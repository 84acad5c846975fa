// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `uma doctor` command implementation.
//!
//! Builds the full pipeline from configuration and reports the health of
//! every retrieval backend, the history store and the generation service.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use uma_config::UmaConfig;
use uma_core::{HealthStatus, UmaError};

use crate::runtime;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn from_health(name: String, health: HealthStatus, duration: Duration) -> Self {
        let (status, message) = match health {
            HealthStatus::Healthy => (CheckStatus::Pass, "healthy".to_string()),
            HealthStatus::Degraded(msg) => (CheckStatus::Warn, msg),
            HealthStatus::Unhealthy(msg) => (CheckStatus::Fail, msg),
        };
        Self {
            name,
            status,
            message,
            duration,
        }
    }
}

/// Run the `uma doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &UmaConfig, plain: bool) -> Result<(), UmaError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let start = Instant::now();
    let results = match runtime::build_orchestrator(config).await {
        Ok(orchestrator) => {
            let report = orchestrator.health().await;
            let elapsed = start.elapsed();
            report
                .into_iter()
                .map(|(name, health)| CheckResult::from_health(name, health, elapsed))
                .collect()
        }
        Err(e) => vec![CheckResult {
            name: "startup".to_string(),
            status: CheckStatus::Fail,
            message: e.to_string(),
            duration: start.elapsed(),
        }],
    };

    println!();
    println!("  uma doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();
    println!("  {}", summary(&results));
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn summary(results: &[CheckResult]) -> String {
    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => "All checks passed.".to_string(),
        1 => "1 issue found.".to_string(),
        n => format!("{n} issues found."),
    }
}
