// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookmarked articles.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::{Article, FavoriteArticle, UserId};

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Bookmarks `article`. Returns [`NewsbotError::Duplicate`] if it is
    /// already a favorite.
    async fn add_favorite(&self, user_id: UserId, article: &Article) -> Result<(), NewsbotError>;

    /// Returns [`NewsbotError::NotFound`] if `url` was not a favorite.
    async fn remove_favorite(&self, user_id: UserId, url: &str) -> Result<(), NewsbotError>;

    /// Favorites, most recently added first.
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteArticle>, NewsbotError>;

    async fn is_favorite(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError>;
}
