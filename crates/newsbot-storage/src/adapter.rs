// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use newsbot_config::model::StorageConfig;
use newsbot_core::types::{Article, ChatId, FavoriteArticle, NewUser, User, UserId};
use newsbot_core::{
    AdapterType, FavoriteStore, HealthStatus, NewsbotError, PluginAdapter, SentArticleLedger,
    SubscriptionRegistry, UserDirectory,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage implementing every repository trait.
///
/// Cheap to clone; clones share the single background connection.
#[derive(Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Opens the configured database, runs migrations and normalizes legacy
    /// subscription topics.
    pub async fn open(config: &StorageConfig) -> Result<Self, NewsbotError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        let normalized = queries::subscriptions::normalize_topics(&db).await?;
        if normalized > 0 {
            info!(rows = normalized, "normalized legacy subscription topics");
        }
        debug!(path = %config.database_path, "SQLite storage initialized");
        Ok(Self { db })
    }

    /// Wraps an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Chats subscribed to `topic`.
    pub async fn subscribers_for_topic(&self, topic: &str) -> Result<Vec<ChatId>, NewsbotError> {
        queries::subscriptions::subscribers_for_topic(&self.db, topic).await
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, NewsbotError> {
        queries::users::get_user(&self.db, user_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, NewsbotError> {
        self.db
            .connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NewsbotError> {
        self.db.checkpoint().await?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for SqliteStorage {
    async fn list_users(&self) -> Result<Vec<User>, NewsbotError> {
        queries::users::list_users(&self.db).await
    }

    async fn update_last_notified(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), NewsbotError> {
        queries::users::update_last_notified(&self.db, user_id, at).await
    }

    async fn find_or_create_user(&self, new: NewUser) -> Result<User, NewsbotError> {
        queries::users::find_or_create_user(&self.db, new).await
    }

    async fn get_user_by_chat(&self, chat_id: ChatId) -> Result<Option<User>, NewsbotError> {
        queries::users::get_user_by_chat(&self.db, chat_id).await
    }

    async fn update_interval(&self, user_id: UserId, minutes: u32) -> Result<(), NewsbotError> {
        queries::users::update_interval(&self.db, user_id, minutes).await
    }

    async fn update_news_limit(&self, user_id: UserId, limit: u32) -> Result<(), NewsbotError> {
        queries::users::update_news_limit(&self.db, user_id, limit).await
    }

    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), NewsbotError> {
        queries::users::set_state(&self.db, user_id, state).await
    }
}

#[async_trait]
impl SubscriptionRegistry for SqliteStorage {
    async fn list_topics(&self, user_id: UserId) -> Result<Vec<String>, NewsbotError> {
        queries::subscriptions::list_topics(&self.db, user_id).await
    }

    async fn add_subscription(&self, user_id: UserId, topic: &str) -> Result<(), NewsbotError> {
        queries::subscriptions::add_subscription(&self.db, user_id, topic).await
    }

    async fn remove_subscription(
        &self,
        user_id: UserId,
        topic: &str,
    ) -> Result<(), NewsbotError> {
        queries::subscriptions::remove_subscription(&self.db, user_id, topic).await
    }

    async fn list_unique_topics(&self) -> Result<Vec<String>, NewsbotError> {
        queries::subscriptions::list_unique_topics(&self.db).await
    }
}

#[async_trait]
impl SentArticleLedger for SqliteStorage {
    async fn is_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        queries::sent_articles::is_sent(&self.db, user_id, url).await
    }

    async fn mark_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        queries::sent_articles::mark_sent(&self.db, user_id, url).await
    }

    async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError> {
        let removed = queries::sent_articles::reset_history(&self.db, user_id).await?;
        debug!(user_id = %user_id, removed, "delivery history reset");
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for SqliteStorage {
    async fn add_favorite(&self, user_id: UserId, article: &Article) -> Result<(), NewsbotError> {
        queries::favorites::add_favorite(&self.db, user_id, article).await
    }

    async fn remove_favorite(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError> {
        queries::favorites::remove_favorite(&self.db, user_id, url).await
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteArticle>, NewsbotError> {
        queries::favorites::list_favorites(&self.db, user_id).await
    }

    async fn is_favorite(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        queries::favorites::is_favorite(&self.db, user_id, url).await
    }
}
