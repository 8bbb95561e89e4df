// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across supplier traits and the delivery engine.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default number of articles delivered per cycle when a user has no usable limit.
pub const DEFAULT_NEWS_LIMIT: u32 = 5;

/// Default delivery interval in minutes for newly registered users.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// Longest topic accepted for a subscription, in characters.
pub const MAX_TOPIC_LENGTH: usize = 255;

/// Internal identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination a delivery sink pushes articles to (a Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered bot user together with their delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Free-form conversation state owned by the command layer.
    pub state: String,
    pub interval_minutes: u32,
    pub news_limit: u32,
    pub last_notified_at: Option<DateTime<Utc>>,
}

impl User {
    /// The number of articles to deliver per cycle, falling back to
    /// `default_limit` (itself at least 1) when the stored limit is zero.
    pub fn effective_limit(&self, default_limit: u32) -> usize {
        let limit = if self.news_limit == 0 {
            default_limit.max(1)
        } else {
            self.news_limit
        };
        limit as usize
    }

    /// The delivery interval, falling back to `default_minutes` when the stored
    /// interval is zero.
    pub fn effective_interval(&self, default_minutes: u32) -> Duration {
        let minutes = if self.interval_minutes == 0 {
            default_minutes
        } else {
            self.interval_minutes
        };
        Duration::from_secs(u64::from(minutes) * 60)
    }

    /// Whether a scheduled delivery is due at `now`.
    ///
    /// Users that were never notified are always due.
    pub fn is_due(&self, now: DateTime<Utc>, default_interval_minutes: u32) -> bool {
        let Some(last) = self.last_notified_at else {
            return true;
        };
        let interval = self.effective_interval(default_interval_minutes);
        match (now - last).to_std() {
            Ok(elapsed) => elapsed >= interval,
            // Clock skew put the last delivery in the future: not due yet.
            Err(_) => false,
        }
    }
}

/// Identity fields supplied on first contact with a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// The outlet an article was published by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub name: String,
    pub url: Option<String>,
}

/// A news article returned by an article source.
///
/// Two articles are the same article iff their URLs are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: Publisher,
}

/// An article a user bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteArticle {
    pub id: i64,
    pub user_id: UserId,
    pub article_url: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub added_at: DateTime<Utc>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays for the delivery engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    Storage,
    Sink,
    Observability,
}

/// Normalizes a user-supplied topic to its canonical form (trimmed, lowercase).
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}
