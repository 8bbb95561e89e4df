// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`NewsService`] implementation handed to the command layer.

use std::sync::Arc;

use async_trait::async_trait;
use newsbot_core::traits::NewsService;
use newsbot_core::types::{Article, FavoriteArticle, User, UserId};
use newsbot_core::{NewsbotError, normalize_topic};
use tracing::warn;

use crate::engine::DeliveryEngine;

/// On-demand news operations backed by a shared [`DeliveryEngine`].
#[derive(Clone)]
pub struct NewsDesk {
    engine: Arc<DeliveryEngine>,
}

impl NewsDesk {
    pub fn new(engine: Arc<DeliveryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<DeliveryEngine> {
        &self.engine
    }
}

#[async_trait]
impl NewsService for NewsDesk {
    async fn process_user(&self, user: &User, force: bool) -> usize {
        self.engine.process_user(user, force).await
    }

    async fn fetch_now(&self, user: &User) -> Result<usize, NewsbotError> {
        let duration = self.engine.settings().on_demand_timeout;
        tokio::time::timeout(duration, self.engine.process_user(user, true))
            .await
            .map_err(|_| {
                warn!(user_id = %user.id, "on-demand delivery timed out");
                NewsbotError::Timeout { duration }
            })
    }

    async fn fetch_for_topic(&self, topic: &str) -> Result<Vec<Article>, NewsbotError> {
        let topic = normalize_topic(topic);
        if topic.is_empty() {
            return Err(NewsbotError::source_msg("topic must not be empty"));
        }
        self.engine.fetch_topic(&topic).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>, NewsbotError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NewsbotError::source_msg("search query must not be empty"));
        }
        self.engine.fetch_topic(query).await
    }

    async fn is_already_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        Ok(self.engine.is_seen(user_id, url).await)
    }

    async fn mark_sent(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError> {
        self.engine.claim(user_id, url).await;
        Ok(())
    }

    async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError> {
        self.engine.reset_history(user_id).await
    }

    async fn add_favorite(&self, user_id: UserId, article: &Article) -> Result<(), NewsbotError> {
        self.engine
            .suppliers()
            .favorites
            .add_favorite(user_id, article)
            .await
    }

    async fn remove_favorite(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError> {
        self.engine
            .suppliers()
            .favorites
            .remove_favorite(user_id, url)
            .await
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteArticle>, NewsbotError> {
        self.engine.suppliers().favorites.list_favorites(user_id).await
    }

    async fn is_favorite(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        self.engine
            .suppliers()
            .favorites
            .is_favorite(user_id, url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::SeenCache;
    use crate::engine::{DeliverySettings, Suppliers};
    use newsbot_test_utils::{
        MemoryStore, MockSource, RecordingSink, SourceBehavior, article, test_user,
    };

    fn desk(store: &MemoryStore, source: &MockSource, settings: DeliverySettings) -> NewsDesk {
        let suppliers = Suppliers {
            source: Arc::new(source.clone()),
            ledger: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            favorites: Arc::new(store.clone()),
            sink: Arc::new(RecordingSink::new()),
        };
        NewsDesk::new(Arc::new(DeliveryEngine::new(
            suppliers,
            Arc::new(SeenCache::default()),
            settings,
        )))
    }

    #[tokio::test]
    async fn mark_then_check_sent() {
        let store = MemoryStore::new();
        let desk = desk(&store, &MockSource::new(), DeliverySettings::default());
        assert!(!desk.is_already_sent(UserId(1), "https://a/1").await.unwrap());
        desk.mark_sent(UserId(1), "https://a/1").await.unwrap();
        desk.mark_sent(UserId(1), "https://a/1").await.unwrap();
        assert!(desk.is_already_sent(UserId(1), "https://a/1").await.unwrap());

        desk.reset_history(UserId(1)).await.unwrap();
        assert!(!desk.is_already_sent(UserId(1), "https://a/1").await.unwrap());
    }

    #[tokio::test]
    async fn ledger_outage_is_hidden_by_cache() {
        let store = MemoryStore::new();
        store.fail_ledger_reads(true);
        store.fail_ledger_writes(true);
        let desk = desk(&store, &MockSource::new(), DeliverySettings::default());

        desk.mark_sent(UserId(1), "https://a/1").await.unwrap();
        assert!(desk.is_already_sent(UserId(1), "https://a/1").await.unwrap());
    }

    #[tokio::test]
    async fn topic_is_normalized_before_fetch() {
        let source = MockSource::new();
        source.set_articles("rust", vec![article("https://a/1")]).await;
        let desk = desk(&MemoryStore::new(), &source, DeliverySettings::default());

        assert_eq!(desk.fetch_for_topic("  RUST ").await.unwrap().len(), 1);
        assert!(desk.fetch_for_topic("   ").await.is_err());
        assert!(desk.search("").await.is_err());
        assert_eq!(source.calls().await, vec!["rust"]);
    }

    #[tokio::test]
    async fn topic_fetch_is_a_plain_passthrough() {
        let store = MemoryStore::new();
        let source = MockSource::new();
        source
            .set_articles(
                "rust",
                vec![
                    newsbot_test_utils::article_aged("https://a/old", chrono::Duration::days(400)),
                    article("https://a/new"),
                ],
            )
            .await;
        store.seed_sent(UserId(1), "https://a/new").await;
        let desk = desk(&store, &source, DeliverySettings::default());

        let urls: Vec<String> = desk
            .fetch_for_topic("rust")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.url)
            .collect();
        assert_eq!(urls, vec!["https://a/old", "https://a/new"]);
    }

    #[tokio::test]
    async fn favorites_pass_through() {
        let store = MemoryStore::new();
        let desk = desk(&store, &MockSource::new(), DeliverySettings::default());
        let a = article("https://a/1");

        desk.add_favorite(UserId(1), &a).await.unwrap();
        assert!(matches!(
            desk.add_favorite(UserId(1), &a).await,
            Err(NewsbotError::Duplicate(_))
        ));
        assert!(desk.is_favorite(UserId(1), &a.url).await.unwrap());
        assert_eq!(desk.list_favorites(UserId(1)).await.unwrap().len(), 1);
        desk.remove_favorite(UserId(1), &a.url).await.unwrap();
        assert!(!desk.is_favorite(UserId(1), &a.url).await.unwrap());
    }

    #[tokio::test]
    async fn search_keeps_query_case_and_fetch_now_ignores_interval() {
        let store = MemoryStore::new();
        let source = MockSource::new();
        source.set_articles("Rust 2024", vec![article("https://a/1")]).await;
        source.set_articles("rust", vec![article("https://a/2")]).await;
        let mut user = test_user(1);
        user.last_notified_at = Some(chrono::Utc::now());
        store.add_user(user.clone(), &["rust"]).await;
        let desk = desk(&store, &source, DeliverySettings::default());

        assert_eq!(desk.search("  Rust 2024 ").await.unwrap().len(), 1);
        assert_eq!(desk.process_user(&user, false).await, 0);
        assert_eq!(desk.fetch_now(&user).await.unwrap(), 1);
        let sent = store.sent_urls(user.id).await;
        assert_eq!(sent.len(), 1);
        assert!(sent.contains("https://a/2"));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_now_is_bounded_by_on_demand_timeout() {
        let store = MemoryStore::new();
        let source = MockSource::new();
        let user = test_user(1);
        store.add_user(user.clone(), &["slow"]).await;
        source
            .set_behavior(
                "slow",
                SourceBehavior::Delayed(Duration::from_secs(30), vec![article("https://a/1")]),
            )
            .await;
        let settings = DeliverySettings {
            fetch_timeout: Duration::from_secs(60),
            on_demand_timeout: Duration::from_secs(5),
            ..DeliverySettings::default()
        };
        let desk = desk(&store, &source, settings);

        assert!(matches!(
            desk.fetch_now(&user).await,
            Err(NewsbotError::Timeout { .. })
        ));
    }
}
