// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery cycles against the real SQLite repositories.

use std::collections::HashSet;
use std::sync::Arc;

use newsbot_config::model::StorageConfig;
use newsbot_core::traits::{SubscriptionRegistry, UserDirectory};
use newsbot_core::types::{ChatId, NewUser};
use newsbot_delivery::{DeliveryEngine, DeliverySettings, SeenCache, Suppliers};
use newsbot_storage::SqliteStorage;
use newsbot_test_utils::{MockSource, RecordingSink, article};

async fn setup() -> (SqliteStorage, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("newsbot.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    (SqliteStorage::open(&config).await.unwrap(), dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cycles_claim_each_article_once() {
    let (storage, _dir) = setup().await;
    let user = storage
        .find_or_create_user(NewUser {
            chat_id: ChatId(42),
            username: None,
            first_name: "Ada".into(),
            last_name: None,
        })
        .await
        .unwrap();
    storage.add_subscription(user.id, "Rust").await.unwrap();

    let source = MockSource::new();
    source
        .set_articles("rust", (0..5).map(|i| article(&format!("https://r/{i}"))).collect())
        .await;
    let sink = RecordingSink::new();
    let storage = Arc::new(storage);
    let engine = Arc::new(DeliveryEngine::new(
        Suppliers {
            source: Arc::new(source.clone()),
            ledger: storage.clone(),
            subscriptions: storage.clone(),
            users: storage.clone(),
            favorites: storage.clone(),
            sink: Arc::new(sink.clone()),
        },
        Arc::new(SeenCache::default()),
        DeliverySettings::default(),
    ));

    let handles = (0..3).map(|_| {
        let engine = Arc::clone(&engine);
        let user = user.clone();
        tokio::spawn(async move { engine.process_user(&user, true).await })
    });
    let fresh_counts: Vec<usize> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(fresh_counts.iter().all(|&n| n <= 5), "{fresh_counts:?}");
    let delivered = sink.urls_for(ChatId(42)).await;
    assert_eq!(delivered.iter().collect::<HashSet<_>>().len(), 5);
    assert_eq!(delivered.len(), 5);

    let refreshed = storage.get_user(user.id).await.unwrap().unwrap();
    assert!(refreshed.last_notified_at.is_some());
}
