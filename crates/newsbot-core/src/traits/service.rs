// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The news capability consumed by the messaging layer.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::{Article, FavoriteArticle, User, UserId};

/// Operations the command layer invokes on behalf of a user.
///
/// Implemented by the delivery crate. The messaging layer depends only on
/// this trait and the repository traits.
#[async_trait]
pub trait NewsService: Send + Sync {
    /// Runs one delivery cycle for `user`. With `force` the timing gate is
    /// skipped. Returns the number of fresh articles found, which may exceed
    /// the number delivered when the user's limit caps the cycle.
    async fn process_user(&self, user: &User, force: bool) -> usize;

    /// Forced delivery cycle bounded by the on-demand timeout.
    async fn fetch_now(&self, user: &User) -> Result<usize, NewsbotError>;

    /// Source passthrough for one normalized topic. Applies neither the
    /// staleness horizon nor the sent history.
    async fn fetch_for_topic(&self, topic: &str) -> Result<Vec<Article>, NewsbotError>;

    /// Free-text search against the article source.
    async fn search(&self, query: &str) -> Result<Vec<Article>, NewsbotError>;

    /// Ledger lookup that falls back to the in-memory cache on error.
    async fn is_already_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError>;

    /// Ledger insert that falls back to the in-memory cache on error.
    async fn mark_sent(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError>;

    /// Clears the ledger and the cache segment for `user_id`.
    async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError>;

    async fn add_favorite(&self, user_id: UserId, article: &Article) -> Result<(), NewsbotError>;

    async fn remove_favorite(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError>;

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteArticle>, NewsbotError>;

    async fn is_favorite(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError>;
}
