// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document collection operations backed by FTS5.

use rusqlite::params;
use uma_core::{Metadata, UmaError};

use crate::database::{map_tr_err, Database};
use crate::models::StoredDocument;
use crate::queries::{metadata_to_sql, parse_metadata};

/// Insert a document into `collection`, returning its row id.
pub async fn add_document(
    db: &Database,
    collection: &str,
    content: &str,
    metadata: &Metadata,
) -> Result<i64, UmaError> {
    let collection = collection.to_string();
    let content = content.to_string();
    let metadata = metadata_to_sql(metadata);
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO documents (collection, content, metadata) VALUES (?1, ?2, ?3)",
                params![collection, content, metadata],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Number of documents in `collection`.
pub async fn count_documents(db: &Database, collection: &str) -> Result<u64, UmaError> {
    let collection = collection.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// BM25 search within one collection.
///
/// Returns documents with their raw `bm25()` value, best match first. FTS5
/// reports lower-is-better scores, so callers wanting a similarity negate it.
pub async fn search_bm25(
    db: &Database,
    collection: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<(StoredDocument, f64)>, UmaError> {
    let Some(expr) = match_expression(query) else {
        return Ok(Vec::new());
    };
    let collection = collection.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<(StoredDocument, f64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT d.id, d.collection, d.content, d.metadata, bm25(documents_fts) AS score
                 FROM documents_fts JOIN documents d ON d.id = documents_fts.rowid
                 WHERE documents_fts MATCH ?1 AND d.collection = ?2
                 ORDER BY score LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(params![expr, collection, limit as i64], |row| {
                    let doc = StoredDocument {
                        id: row.get(0)?,
                        collection: row.get(1)?,
                        content: row.get(2)?,
                        metadata: parse_metadata(3, row.get(3)?)?,
                    };
                    Ok((doc, row.get::<_, f64>(4)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

/// Turn free text into an FTS5 expression: each word quoted, OR-joined.
///
/// Quoting keeps punctuation in user input from being read as query syntax.
fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_expression_quotes_terms() {
        assert_eq!(
            match_expression("golden retriever?").as_deref(),
            Some("\"golden\" OR \"retriever\"")
        );
        assert_eq!(match_expression("?!  "), None);
    }

    #[tokio::test]
    async fn search_finds_documents_in_collection_only() {
        let db = Database::open_in_memory().await.unwrap();
        let meta = Metadata::new();
        add_document(&db, "events", "city marathon on sunday", &meta)
            .await
            .unwrap();
        add_document(&db, "events", "jazz concert in the park", &meta)
            .await
            .unwrap();
        add_document(&db, "notes", "marathon training plan", &meta)
            .await
            .unwrap();

        let hits = search_bm25(&db, "events", "marathon", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.content, "city marathon on sunday");
        assert_eq!(count_documents(&db, "events").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn better_matches_have_lower_bm25() {
        let db = Database::open_in_memory().await.unwrap();
        let meta = Metadata::new();
        add_document(&db, "d", "marathon marathon marathon results", &meta)
            .await
            .unwrap();
        add_document(&db, "d", "results of the weekly chess club meeting and marathon", &meta)
            .await
            .unwrap();

        let hits = search_bm25(&db, "d", "marathon", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].1 <= hits[1].1);
        assert!(hits[0].0.content.starts_with("marathon marathon"));
    }

    #[tokio::test]
    async fn metadata_is_returned() {
        let db = Database::open_in_memory().await.unwrap();
        let mut meta = Metadata::new();
        meta.insert("timestamp".into(), "2026-03-01".into());
        add_document(&db, "d", "spring festival", &meta).await.unwrap();

        let hits = search_bm25(&db, "d", "festival", 5).await.unwrap();
        assert_eq!(hits[0].0.metadata.get("timestamp").unwrap(), "2026-03-01");
    }
}
