// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `uma shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Every line
//! goes through the orchestrator; one session id per invocation.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use uma_agent::AgentResponse;
use uma_config::UmaConfig;
use uma_core::UmaError;

use crate::runtime;

pub async fn run_shell(config: &UmaConfig, user_id: &str) -> Result<(), UmaError> {
    let orchestrator = runtime::build_orchestrator(config).await?;
    let session_id = uuid::Uuid::new_v4().to_string();

    let mut rl = DefaultEditor::new()
        .map_err(|e| UmaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", user_id.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let response = orchestrator.respond(user_id, &session_id, trimmed).await;
                print_response(&response);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }
    Ok(())
}

fn print_response(response: &AgentResponse) {
    if response.is_fallback() {
        println!("{}", response.text.yellow());
    } else {
        println!("{}", response.text);
    }
    println!("{}\n", status_line(response).dimmed());
}

/// One-line summary of how the answer was produced.
fn status_line(response: &AgentResponse) -> String {
    let m = &response.metadata;
    let retrieval = match &m.retrieval {
        None => "skipped".to_string(),
        Some(uma_retrieval::RetrievalAvailability::Complete) => "complete".to_string(),
        Some(uma_retrieval::RetrievalAvailability::Degraded { failed }) => {
            format!("degraded ({})", failed.join(", "))
        }
        Some(uma_retrieval::RetrievalAvailability::Unavailable) => "unavailable".to_string(),
    };
    format!(
        "[{} | evidence {} | history {} | retrieval {} | {}ms]",
        m.response_type, m.evidence_count, m.history_turns, retrieval, m.elapsed_ms
    )
}
