// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory repository supplier with failure injection.
//!
//! `MemoryStore` implements every repository trait the delivery engine and the
//! command layer consume. Individual operations can be switched to fail so
//! tests can drive the degradation paths without a broken SQLite file.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use newsbot_core::traits::{FavoriteStore, SentArticleLedger, SubscriptionRegistry, UserDirectory};
use newsbot_core::types::{Article, ChatId, FavoriteArticle, NewUser, User, UserId};
use newsbot_core::{NewsbotError, normalize_topic};

#[derive(Default)]
struct StoreData {
    users: BTreeMap<UserId, User>,
    topics: HashMap<UserId, Vec<String>>,
    sent: HashMap<UserId, HashSet<String>>,
    favorites: Vec<FavoriteArticle>,
    next_user_id: i64,
    next_favorite_id: i64,
}

#[derive(Default)]
struct Faults {
    ledger_reads: AtomicBool,
    ledger_writes: AtomicBool,
    topics: AtomicBool,
    list_users: AtomicBool,
    last_notified: AtomicBool,
}

/// In-memory users, subscriptions, sent history and favorites.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<StoreData>>,
    faults: Arc<Faults>,
    topic_failures: Arc<Mutex<HashSet<UserId>>>,
    claims: Arc<AtomicUsize>,
}

fn injected(what: &str) -> NewsbotError {
    NewsbotError::Storage {
        source: Box::new(std::io::Error::other(format!("injected {what} failure"))),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `user` and subscribes them to `topics`.
    pub async fn add_user(&self, user: User, topics: &[&str]) {
        let mut data = self.data.lock().await;
        data.next_user_id = data.next_user_id.max(user.id.0);
        data.topics
            .insert(user.id, topics.iter().map(|t| normalize_topic(t)).collect());
        data.users.insert(user.id, user);
    }

    /// Records `url` as already sent to `user_id`.
    pub async fn seed_sent(&self, user_id: UserId, url: &str) {
        self.data
            .lock()
            .await
            .sent
            .entry(user_id)
            .or_default()
            .insert(url.to_string());
    }

    pub async fn user(&self, user_id: UserId) -> Option<User> {
        self.data.lock().await.users.get(&user_id).cloned()
    }

    pub async fn last_notified(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.user(user_id).await.and_then(|u| u.last_notified_at)
    }

    /// URLs recorded in the ledger for `user_id`.
    pub async fn sent_urls(&self, user_id: UserId) -> HashSet<String> {
        self.data
            .lock()
            .await
            .sent
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `mark_sent` calls that recorded a new URL.
    pub fn successful_claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn fail_ledger_reads(&self, fail: bool) {
        self.faults.ledger_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_ledger_writes(&self, fail: bool) {
        self.faults.ledger_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `list_topics` fail for every user.
    pub fn fail_topics(&self, fail: bool) {
        self.faults.topics.store(fail, Ordering::SeqCst);
    }

    /// Makes `list_topics` fail for `user_id` only.
    pub async fn fail_topics_for(&self, user_id: UserId) {
        self.topic_failures.lock().await.insert(user_id);
    }

    pub fn fail_list_users(&self, fail: bool) {
        self.faults.list_users.store(fail, Ordering::SeqCst);
    }

    pub fn fail_last_notified(&self, fail: bool) {
        self.faults.last_notified.store(fail, Ordering::SeqCst);
    }

    async fn update_user(
        &self,
        user_id: UserId,
        apply: impl FnOnce(&mut User) + Send,
    ) -> Result<(), NewsbotError> {
        let mut data = self.data.lock().await;
        let user = data
            .users
            .get_mut(&user_id)
            .ok_or_else(|| NewsbotError::NotFound(format!("user {user_id}")))?;
        apply(user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, NewsbotError> {
        if self.faults.list_users.load(Ordering::SeqCst) {
            return Err(injected("list_users"));
        }
        Ok(self.data.lock().await.users.values().cloned().collect())
    }

    async fn update_last_notified(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), NewsbotError> {
        if self.faults.last_notified.load(Ordering::SeqCst) {
            return Err(injected("update_last_notified"));
        }
        self.update_user(user_id, |u| u.last_notified_at = Some(at))
            .await
    }

    async fn find_or_create_user(&self, new: NewUser) -> Result<User, NewsbotError> {
        let mut data = self.data.lock().await;
        if let Some(existing) = data.users.values().find(|u| u.chat_id == new.chat_id) {
            return Ok(existing.clone());
        }
        data.next_user_id += 1;
        let user = User {
            id: UserId(data.next_user_id),
            chat_id: new.chat_id,
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            state: String::new(),
            interval_minutes: newsbot_core::types::DEFAULT_INTERVAL_MINUTES,
            news_limit: newsbot_core::types::DEFAULT_NEWS_LIMIT,
            last_notified_at: None,
        };
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_chat(&self, chat_id: ChatId) -> Result<Option<User>, NewsbotError> {
        Ok(self
            .data
            .lock()
            .await
            .users
            .values()
            .find(|u| u.chat_id == chat_id)
            .cloned())
    }

    async fn update_interval(&self, user_id: UserId, minutes: u32) -> Result<(), NewsbotError> {
        self.update_user(user_id, |u| u.interval_minutes = minutes)
            .await
    }

    async fn update_news_limit(&self, user_id: UserId, limit: u32) -> Result<(), NewsbotError> {
        self.update_user(user_id, |u| u.news_limit = limit).await
    }

    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), NewsbotError> {
        let state = state.to_string();
        self.update_user(user_id, move |u| u.state = state).await
    }
}

#[async_trait]
impl SubscriptionRegistry for MemoryStore {
    async fn list_topics(&self, user_id: UserId) -> Result<Vec<String>, NewsbotError> {
        if self.faults.topics.load(Ordering::SeqCst)
            || self.topic_failures.lock().await.contains(&user_id)
        {
            return Err(injected("list_topics"));
        }
        Ok(self
            .data
            .lock()
            .await
            .topics
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_subscription(&self, user_id: UserId, topic: &str) -> Result<(), NewsbotError> {
        let topic = normalize_topic(topic);
        let mut data = self.data.lock().await;
        let topics = data.topics.entry(user_id).or_default();
        if topics.contains(&topic) {
            return Err(NewsbotError::Duplicate(format!("subscription `{topic}`")));
        }
        topics.push(topic);
        Ok(())
    }

    async fn remove_subscription(&self, user_id: UserId, topic: &str) -> Result<(), NewsbotError> {
        let topic = normalize_topic(topic);
        let mut data = self.data.lock().await;
        let topics = data.topics.entry(user_id).or_default();
        let before = topics.len();
        topics.retain(|t| *t != topic);
        if topics.len() == before {
            return Err(NewsbotError::NotFound(format!("subscription `{topic}`")));
        }
        Ok(())
    }

    async fn list_unique_topics(&self) -> Result<Vec<String>, NewsbotError> {
        let data = self.data.lock().await;
        let mut unique: Vec<String> = data
            .topics
            .values()
            .flatten()
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        unique.sort();
        Ok(unique)
    }
}

#[async_trait]
impl SentArticleLedger for MemoryStore {
    async fn is_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        if self.faults.ledger_reads.load(Ordering::SeqCst) {
            return Err(injected("is_sent"));
        }
        Ok(self
            .data
            .lock()
            .await
            .sent
            .get(&user_id)
            .is_some_and(|urls| urls.contains(url)))
    }

    async fn mark_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        if self.faults.ledger_writes.load(Ordering::SeqCst) {
            return Err(injected("mark_sent"));
        }
        let inserted = self
            .data
            .lock()
            .await
            .sent
            .entry(user_id)
            .or_default()
            .insert(url.to_string());
        if inserted {
            self.claims.fetch_add(1, Ordering::SeqCst);
        }
        Ok(inserted)
    }

    async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError> {
        if self.faults.ledger_writes.load(Ordering::SeqCst) {
            return Err(injected("reset_history"));
        }
        self.data.lock().await.sent.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn add_favorite(&self, user_id: UserId, article: &Article) -> Result<(), NewsbotError> {
        let mut data = self.data.lock().await;
        if data
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.article_url == article.url)
        {
            return Err(NewsbotError::Duplicate(format!("favorite {}", article.url)));
        }
        data.next_favorite_id += 1;
        let favorite = FavoriteArticle {
            id: data.next_favorite_id,
            user_id,
            article_url: article.url.clone(),
            title: article.title.clone(),
            source: article.source.name.clone(),
            published_at: article.published_at,
            added_at: Utc::now(),
        };
        data.favorites.push(favorite);
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError> {
        let mut data = self.data.lock().await;
        let before = data.favorites.len();
        data.favorites
            .retain(|f| !(f.user_id == user_id && f.article_url == url));
        if data.favorites.len() == before {
            return Err(NewsbotError::NotFound(format!("favorite {url}")));
        }
        Ok(())
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteArticle>, NewsbotError> {
        let data = self.data.lock().await;
        // Newest first, matching the SQLite ordering.
        Ok(data
            .favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn is_favorite(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
        Ok(self
            .data
            .lock()
            .await
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.article_url == url))
    }
}
