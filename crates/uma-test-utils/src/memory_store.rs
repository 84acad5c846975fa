// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory history store with switchable failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use uma_core::{
    AdapterType, ConversationTurn, HealthStatus, HistoryStore, PluginAdapter, ProfileDelta,
    UmaError, UserProfile,
};

/// Keeps turns and profiles in process memory.
///
/// `fail_reads` / `fail_writes` make the corresponding operations return a
/// storage error, for exercising degradation paths.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    turns: Mutex<Vec<ConversationTurn>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a profile directly.
    pub async fn put_profile(&self, profile: UserProfile) {
        self.profiles
            .lock()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    /// Every stored turn for `user_id`, oldest first.
    pub async fn all_turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.turns
            .lock()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), UmaError> {
        if flag.load(Ordering::SeqCst) {
            Err(UmaError::storage(format!("in-memory store {op} disabled")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PluginAdapter for InMemoryHistoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), UmaError> {
        self.check(&self.fail_writes, "write")?;
        self.turns.lock().await.push(turn.clone());
        Ok(())
    }

    async fn recent_turns(
        &self,
        user_id: &str,
        n: usize,
    ) -> Result<Vec<ConversationTurn>, UmaError> {
        self.check(&self.fail_reads, "read")?;
        let all = self.all_turns(user_id).await;
        let skip = all.len().saturating_sub(n);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, UmaError> {
        self.check(&self.fail_reads, "read")?;
        Ok(self.profiles.lock().await.get(user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        delta: &ProfileDelta,
    ) -> Result<UserProfile, UmaError> {
        self.check(&self.fail_writes, "write")?;
        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::empty(user_id));
        profile.apply(delta);
        Ok(profile.clone())
    }
}
