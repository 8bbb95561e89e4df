// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-user delivery cycle.
//!
//! One call to [`DeliveryEngine::process_user`] decides whether the user is
//! due, gathers candidates from every subscribed topic, drops stale and
//! already-seen articles, caps the result at the user's limit, claims each
//! capped article in the ledger and hands the claimed ones to the sink.
//!
//! An article is claimed before it is sent. Two concurrent cycles for the
//! same user race on the ledger insert and exactly one of them delivers.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use newsbot_config::model::DeliveryConfig;
use newsbot_core::traits::{
    ArticleSource, DeliverySink, FavoriteStore, SentArticleLedger, SubscriptionRegistry,
    UserDirectory,
};
use newsbot_core::types::{Article, User, UserId};
use newsbot_core::NewsbotError;
use tracing::{debug, info, warn};

use crate::cache::SeenCache;

/// Tunables for the delivery cycle, resolved from `[delivery]`.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub default_interval_minutes: u32,
    pub default_news_limit: u32,
    /// Articles older than this are never delivered.
    pub staleness: chrono::Duration,
    pub fetch_timeout: Duration,
    pub send_timeout: Duration,
    pub on_demand_timeout: Duration,
}

impl DeliverySettings {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            default_interval_minutes: config.default_interval_minutes.max(1),
            default_news_limit: config.default_news_limit.max(1),
            staleness: chrono::Duration::days(i64::from(config.staleness_days)),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            send_timeout: Duration::from_secs(config.send_timeout_secs),
            on_demand_timeout: Duration::from_secs(config.on_demand_timeout_secs),
        }
    }

    /// The number of articles to deliver to `user` per cycle.
    pub fn limit_for(&self, user: &User) -> usize {
        user.effective_limit(self.default_news_limit)
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

/// The suppliers a delivery engine works against.
#[derive(Clone)]
pub struct Suppliers {
    pub source: Arc<dyn ArticleSource>,
    pub ledger: Arc<dyn SentArticleLedger>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    pub users: Arc<dyn UserDirectory>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub sink: Arc<dyn DeliverySink>,
}

/// Runs delivery cycles for individual users.
pub struct DeliveryEngine {
    suppliers: Suppliers,
    cache: Arc<SeenCache>,
    settings: DeliverySettings,
}

impl DeliveryEngine {
    pub fn new(suppliers: Suppliers, cache: Arc<SeenCache>, settings: DeliverySettings) -> Self {
        Self {
            suppliers,
            cache,
            settings,
        }
    }

    pub fn suppliers(&self) -> &Suppliers {
        &self.suppliers
    }

    pub fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    pub fn cache(&self) -> &SeenCache {
        &self.cache
    }

    /// Runs one delivery cycle for `user` and returns the number of fresh
    /// articles found, before the cap is applied.
    ///
    /// Without `force`, a user whose interval has not elapsed is skipped.
    /// Supplier failures are logged and never escape this call.
    pub async fn process_user(&self, user: &User, force: bool) -> usize {
        let now = Utc::now();
        if !force && !user.is_due(now, self.settings.default_interval_minutes) {
            debug!(user_id = %user.id, "delivery not due yet");
            return 0;
        }

        let topics = match self.suppliers.subscriptions.list_topics(user.id).await {
            Ok(topics) => topics,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "failed to load subscriptions");
                return 0;
            }
        };
        if topics.is_empty() {
            debug!(user_id = %user.id, "no subscriptions");
            return 0;
        }

        let fresh = self.collect_fresh(user.id, &topics).await;
        let limit = self.settings.limit_for(user);

        let mut claimed = 0;
        for article in fresh.iter().take(limit) {
            if !self.claim(user.id, &article.url).await {
                debug!(user_id = %user.id, url = %article.url, "article claimed by a concurrent cycle");
                continue;
            }
            claimed += 1;
            self.deliver(user, article).await;
        }

        if let Err(e) = self
            .suppliers
            .users
            .update_last_notified(user.id, now)
            .await
        {
            warn!(user_id = %user.id, error = %e, "failed to record delivery time");
        }

        #[cfg(feature = "prometheus")]
        newsbot_prometheus::record_delivered(claimed as u64);

        if fresh.is_empty() {
            debug!(user_id = %user.id, force, "delivery cycle found nothing new");
        } else {
            info!(
                user_id = %user.id,
                fresh = fresh.len(),
                delivered = claimed,
                force,
                "delivery cycle complete"
            );
        }
        fresh.len()
    }

    /// Every fresh, unseen, distinct article across `topics`, in topic order.
    async fn collect_fresh(&self, user_id: UserId, topics: &[String]) -> Vec<Article> {
        let horizon = Utc::now() - self.settings.staleness;
        let mut in_pass: HashSet<String> = HashSet::new();
        let mut fresh = Vec::new();

        for topic in topics {
            let articles = match self.fetch_topic(topic).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(user_id = %user_id, topic = %topic, error = %e, "skipping topic");
                    continue;
                }
            };

            for article in articles {
                if article.published_at < horizon {
                    continue;
                }
                if !in_pass.insert(article.url.clone()) {
                    continue;
                }
                if self.is_seen(user_id, &article.url).await {
                    continue;
                }
                fresh.push(article);
            }
        }
        fresh
    }

    /// Fetches one topic under the per-call timeout.
    pub async fn fetch_topic(&self, topic: &str) -> Result<Vec<Article>, NewsbotError> {
        let duration = self.settings.fetch_timeout;
        match tokio::time::timeout(duration, self.suppliers.source.fetch_articles(topic)).await {
            Ok(Ok(articles)) => Ok(articles),
            Ok(Err(e)) => {
                #[cfg(feature = "prometheus")]
                newsbot_prometheus::record_source_failure("error");
                Err(e)
            }
            Err(_) => {
                #[cfg(feature = "prometheus")]
                newsbot_prometheus::record_source_failure("timeout");
                Err(NewsbotError::Timeout { duration })
            }
        }
    }

    async fn deliver(&self, user: &User, article: &Article) {
        let result = tokio::time::timeout(
            self.settings.send_timeout,
            self.suppliers.sink.deliver(user.chat_id, article),
        )
        .await;
        let error = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(_) => NewsbotError::Timeout {
                duration: self.settings.send_timeout,
            },
        };
        warn!(user_id = %user.id, url = %article.url, error = %error, "delivery failed");
        #[cfg(feature = "prometheus")]
        newsbot_prometheus::record_delivery_failure();
    }

    /// Ledger membership, falling back to the cache when the ledger is unreadable.
    pub async fn is_seen(&self, user_id: UserId, url: &str) -> bool {
        match self.suppliers.ledger.is_sent(user_id, url).await {
            Ok(seen) => seen,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "ledger read failed, using seen cache");
                self.cache.contains(user_id, url)
            }
        }
    }

    /// Records `url` as sent and reports whether this call recorded it first.
    ///
    /// When the ledger is unwritable the claim is made against the cache.
    pub async fn claim(&self, user_id: UserId, url: &str) -> bool {
        match self.suppliers.ledger.mark_sent(user_id, url).await {
            Ok(inserted) => inserted,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "ledger write failed, using seen cache");
                #[cfg(feature = "prometheus")]
                newsbot_prometheus::record_fallback_write();
                self.cache.insert(user_id, url)
            }
        }
    }

    /// Forgets every article sent to `user_id`, in the ledger and the cache.
    pub async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError> {
        self.cache.clear_user(user_id);
        self.suppliers.ledger.reset_history(user_id).await
    }
}
