// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Article source trait for external news providers.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::Article;

/// Fetches candidate articles for a topic.
///
/// Implementations return articles in provider order (newest first for the
/// bundled providers). An empty topic is rejected with
/// [`NewsbotError::Source`].
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, topic: &str) -> Result<Vec<Article>, NewsbotError>;
}
