// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History store behaviour through the trait object, on a file-backed database.

use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;
use uma_config::model::StorageConfig;
use uma_core::{ConversationTurn, HistoryStore, ProfileDelta, Role};
use uma_storage::SqliteHistoryStore;

async fn open_store(dir: &tempfile::TempDir) -> Arc<dyn HistoryStore> {
    let config = StorageConfig {
        database_path: dir.path().join("uma.db").display().to_string(),
        wal_mode: true,
    };
    Arc::new(SqliteHistoryStore::open(&config).await.unwrap())
}

#[tokio::test]
async fn concurrent_appends_for_one_user_are_all_kept() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let turn = ConversationTurn::new("u1", "s1", Role::User, format!("message {i}"));
            store.append_turn(&turn).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.recent_turns("u1", 100).await.unwrap().len(), 20);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let store = open_store(&dir).await;
        store
            .append_turn(&ConversationTurn::new("u1", "s1", Role::User, "hello"))
            .await
            .unwrap();
        store
            .update_profile(
                "u1",
                &ProfileDelta {
                    interests: vec!["cycling".into()],
                    turn_increment: 1,
                    interaction_at: Utc::now(),
                    max_interests: 10,
                },
            )
            .await
            .unwrap();
    }

    let store = open_store(&dir).await;
    let turns = store.recent_turns("u1", 5).await.unwrap();
    assert_eq!(turns[0].content, "hello");
    let profile = store.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.interests, vec!["cycling"]);
    assert_eq!(profile.turn_count, 1);
}
