// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `uma ingest` command implementation.
//!
//! Reads JSON lines and stores each document in a local full-text backend.

use std::path::Path;

use serde::Deserialize;
use tracing::info;
use uma_config::UmaConfig;
use uma_config::model::{BackendConfig, BackendKind};
use uma_core::{Metadata, UmaError};
use uma_retrieval::open_fts_backend;

#[derive(Debug, Deserialize)]
struct IngestRecord {
    content: String,
    #[serde(default)]
    metadata: Metadata,
}

pub async fn run_ingest(
    config: &UmaConfig,
    file: &Path,
    backend: Option<&str>,
) -> Result<(), UmaError> {
    let target = select_backend(&config.retrieval.backends, backend)?;
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| UmaError::Internal(format!("cannot read {}: {e}", file.display())))?;
    let records = parse_records(&text)?;

    let fts = open_fts_backend(target).await?;
    for record in &records {
        fts.add_document(&record.content, &record.metadata).await?;
    }
    let total = fts.document_count().await?;

    info!(backend = %target.name, added = records.len(), total, "documents ingested");
    println!(
        "added {} documents to `{}` (collection `{}`, {} total)",
        records.len(),
        target.name,
        target.collection,
        total
    );
    Ok(())
}

fn select_backend<'a>(
    backends: &'a [BackendConfig],
    name: Option<&str>,
) -> Result<&'a BackendConfig, UmaError> {
    let found = match name {
        Some(name) => backends.iter().find(|b| b.name == name),
        None => backends.iter().find(|b| b.kind == BackendKind::Fts),
    };
    match found {
        Some(b) if b.kind == BackendKind::Fts => Ok(b),
        Some(b) => Err(UmaError::Config(format!(
            "backend `{}` is not a local fts backend",
            b.name
        ))),
        None => Err(UmaError::Config(match name {
            Some(name) => format!("no backend named `{name}`"),
            None => "no fts backend configured".to_string(),
        })),
    }
}

/// Parses one record per non-blank line; errors name the 1-based line.
fn parse_records(text: &str) -> Result<Vec<IngestRecord>, UmaError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let record: IngestRecord = serde_json::from_str(line)
                .map_err(|e| UmaError::Internal(format!("line {}: {e}", i + 1)))?;
            if record.content.trim().is_empty() {
                return Err(UmaError::Internal(format!("line {}: empty content", i + 1)));
            }
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use uma_config::model::RetrievalConfig;

    use super::*;

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let text = r#"{"content": "Practice moved to 10am", "metadata": {"timestamp": "2026-05-16"}}

{"content": "Bring gloves"}
"#;
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metadata["timestamp"], "2026-05-16");
        assert!(records[1].metadata.is_empty());
    }

    #[test]
    fn reports_bad_line_number() {
        let err = parse_records("{\"content\": \"ok\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn rejects_empty_content() {
        assert!(parse_records(r#"{"content": "  "}"#).is_err());
    }

    #[test]
    fn selects_first_fts_backend_by_default() {
        let backends = RetrievalConfig::default().backends;
        assert_eq!(select_backend(&backends, None).unwrap().name, "primary");
        assert_eq!(select_backend(&backends, Some("secondary")).unwrap().collection, "notes");
        assert!(select_backend(&backends, Some("missing")).is_err());
    }

    #[test]
    fn http_backend_cannot_be_ingested_into() {
        let mut backends = RetrievalConfig::default().backends;
        backends[0].kind = BackendKind::Http;
        backends[0].url = Some("http://localhost:9/search".into());
        let err = select_backend(&backends, Some("primary")).unwrap_err();
        assert!(err.to_string().contains("not a local fts backend"));
    }
}
