// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`HistoryStore`] trait.

use async_trait::async_trait;
use tracing::debug;

use uma_config::model::StorageConfig;
use uma_core::{
    AdapterType, ConversationTurn, HealthStatus, HistoryStore, PluginAdapter, ProfileDelta,
    UmaError, UserProfile,
};

use crate::database::{map_tr_err, Database};
use crate::models::TurnStatistics;
use crate::queries;

/// SQLite-backed history store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    db: Database,
}

impl SqliteHistoryStore {
    /// Open the database named in `config` and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, UmaError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite history store initialized");
        Ok(Self { db })
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Substring search over one user's turns, newest first.
    pub async fn search_turns(
        &self,
        user_id: &str,
        needle: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, UmaError> {
        queries::turns::search_turns(&self.db, user_id, needle, limit).await
    }

    pub async fn statistics(&self, user_id: &str) -> Result<TurnStatistics, UmaError> {
        queries::turns::statistics(&self.db, user_id).await
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), UmaError> {
        self.db.close().await?;
        debug!("history store closed");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteHistoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), UmaError> {
        queries::turns::append_turn(&self.db, turn).await
    }

    async fn recent_turns(
        &self,
        user_id: &str,
        n: usize,
    ) -> Result<Vec<ConversationTurn>, UmaError> {
        queries::turns::recent_turns(&self.db, user_id, n).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, UmaError> {
        queries::profiles::get_profile(&self.db, user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        delta: &ProfileDelta,
    ) -> Result<UserProfile, UmaError> {
        queries::profiles::update_profile(&self.db, user_id, delta).await
    }
}
