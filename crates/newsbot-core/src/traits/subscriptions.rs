// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic subscriptions per user.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::UserId;

/// Per-user set of normalized topics.
///
/// Topics are stored trimmed and lowercased. Implementations normalize on
/// both write and lookup.
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    /// Topics for `user_id` in registration order.
    async fn list_topics(&self, user_id: UserId) -> Result<Vec<String>, NewsbotError>;

    /// Subscribes `user_id` to `topic`.
    ///
    /// Returns [`NewsbotError::Duplicate`] if the subscription already exists.
    async fn add_subscription(&self, user_id: UserId, topic: &str) -> Result<(), NewsbotError>;

    /// Removes a subscription. Returns [`NewsbotError::NotFound`] if it did not exist.
    async fn remove_subscription(&self, user_id: UserId, topic: &str)
    -> Result<(), NewsbotError>;

    /// Distinct topics across all users.
    async fn list_unique_topics(&self) -> Result<Vec<String>, NewsbotError>;
}
