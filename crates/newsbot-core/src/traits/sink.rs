// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery sink trait for pushing articles to users.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::{Article, ChatId};

/// Pushes one formatted article to one destination.
///
/// Failures are expected to be transient and are reported as
/// [`NewsbotError::Channel`].
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, chat_id: ChatId, article: &Article) -> Result<(), NewsbotError>;
}
