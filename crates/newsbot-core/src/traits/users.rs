// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::NewsbotError;
use crate::types::{ChatId, NewUser, User, UserId};

/// Registered users and their delivery settings.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every registered user.
    async fn list_users(&self) -> Result<Vec<User>, NewsbotError>;

    /// Sets the last successful delivery check for `user_id`.
    async fn update_last_notified(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), NewsbotError>;

    /// Returns the user for `new.chat_id`, registering them on first contact.
    async fn find_or_create_user(&self, new: NewUser) -> Result<User, NewsbotError>;

    async fn get_user_by_chat(&self, chat_id: ChatId) -> Result<Option<User>, NewsbotError>;

    async fn update_interval(&self, user_id: UserId, minutes: u32) -> Result<(), NewsbotError>;

    async fn update_news_limit(&self, user_id: UserId, limit: u32) -> Result<(), NewsbotError>;

    /// Stores the command-layer conversation state tag.
    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), NewsbotError>;
}
