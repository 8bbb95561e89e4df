// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user record of articles already delivered.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::UserId;

/// Durable set of (user, article URL) pairs.
#[async_trait]
pub trait SentArticleLedger: Send + Sync {
    /// Returns `true` if `url` was already recorded for `user_id`.
    async fn is_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError>;

    /// Records `url` for `user_id`.
    ///
    /// Returns `true` only when this call inserted the record. A second call
    /// for the same pair is a no-op returning `false`, which makes the insert
    /// usable as a claim between concurrent deliveries.
    async fn mark_sent(&self, user_id: UserId, url: &str) -> Result<bool, NewsbotError>;

    /// Forgets every record for `user_id`.
    async fn reset_history(&self, user_id: UserId) -> Result<(), NewsbotError>;
}
