// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the newsbot workspace.

use thiserror::Error;

/// The primary error type used across all newsbot supplier traits and core operations.
#[derive(Debug, Error)]
pub enum NewsbotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Article source errors (HTTP failure, bad status, undecodable payload).
    #[error("news source error: {message}")]
    Source {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery transport errors (send failure, rate limiting, bad destination).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record already exists and the operation does not allow duplicates.
    #[error("already exists: {0}")]
    Duplicate(String),

    /// A lifecycle operation was invoked in a state that does not allow it.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NewsbotError {
    /// Builds a [`NewsbotError::Source`] without an underlying cause.
    pub fn source_msg(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`NewsbotError::Channel`] without an underlying cause.
    pub fn channel_msg(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` for errors worth retrying on the next cycle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Source { .. } | Self::Channel { .. } | Self::Timeout { .. }
        )
    }
}
