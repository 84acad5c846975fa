// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uma - a conversational assistant with hybrid retrieval.
//!
//! This is the binary entry point. It stands in for the messaging front-end:
//! one-shot questions, an interactive shell, document ingestion and history
//! inspection.

mod doctor;
mod history;
mod ingest;
mod runtime;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use uma_config::UmaConfig;
use uma_core::UmaError;

/// Uma - a conversational assistant with hybrid retrieval.
#[derive(Parser, Debug)]
#[command(name = "uma", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question and exit.
    Ask {
        /// The question.
        message: String,
        #[arg(long, default_value = "local")]
        user: String,
        /// Print the answer with its metadata as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Launch an interactive REPL session.
    Shell {
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Load JSON-lines documents into a local full-text backend.
    Ingest {
        /// File with one `{"content": .., "metadata": {..}}` object per line.
        file: PathBuf,
        /// Target backend name; defaults to the first fts backend.
        #[arg(long)]
        backend: Option<String>,
    },
    /// Search or summarize a user's stored conversation.
    History {
        #[arg(long, default_value = "local")]
        user: String,
        /// Only turns containing this text.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print counters instead of turns.
        #[arg(long)]
        stats: bool,
    },
    /// Check the health of every backend, the store and the generator.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => uma_config::load_and_validate_path(path),
        None => uma_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            uma_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    runtime::init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: UmaConfig) -> Result<(), UmaError> {
    match command {
        Some(Commands::Ask { message, user, json }) => {
            let orchestrator = runtime::build_orchestrator(&config).await?;
            let session_id = uuid::Uuid::new_v4().to_string();
            let response = orchestrator.respond(&user, &session_id, &message).await;
            if json {
                let rendered = serde_json::to_string_pretty(&response)
                    .map_err(|e| UmaError::Internal(format!("failed to encode response: {e}")))?;
                println!("{rendered}");
            } else {
                println!("{}", response.text);
            }
            Ok(())
        }
        Some(Commands::Shell { user }) => shell::run_shell(&config, &user).await,
        Some(Commands::Ingest { file, backend }) => {
            ingest::run_ingest(&config, &file, backend.as_deref()).await
        }
        Some(Commands::History {
            user,
            search,
            limit,
            stats,
        }) => history::run_history(&config, &user, search.as_deref(), limit, stats).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("uma: use --help for available commands");
            Ok(())
        }
    }
}
