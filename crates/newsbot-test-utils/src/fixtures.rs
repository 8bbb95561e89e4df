// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for domain values used across tests.

use chrono::{Duration, Utc};
use newsbot_core::types::{Article, ChatId, Publisher, User, UserId};

/// A user with default settings who was never notified.
///
/// The chat id is `id + 1000` so chat ids and user ids never collide in assertions.
pub fn test_user(id: i64) -> User {
    User {
        id: UserId(id),
        chat_id: ChatId(id + 1000),
        username: Some(format!("user{id}")),
        first_name: format!("User {id}"),
        last_name: None,
        state: String::new(),
        interval_minutes: 60,
        news_limit: 5,
        last_notified_at: None,
    }
}

/// An article published an hour ago.
pub fn article(url: &str) -> Article {
    article_aged(url, Duration::hours(1))
}

/// An article published `age` before now.
pub fn article_aged(url: &str, age: Duration) -> Article {
    Article {
        title: format!("Article {url}"),
        description: format!("Description of {url}"),
        content: String::new(),
        url: url.to_string(),
        image: None,
        published_at: Utc::now() - age,
        source: Publisher {
            name: "Test Wire".to_string(),
            url: None,
        },
    }
}
