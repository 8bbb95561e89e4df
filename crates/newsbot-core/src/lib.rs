// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the newsbot workspace.
//!
//! This crate provides the supplier trait definitions, the shared error type
//! and the domain types used by every other crate. Concrete suppliers
//! (storage, fetcher, Telegram sink) implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::NewsbotError;
pub use types::{
    AdapterType, Article, ChatId, FavoriteArticle, HealthStatus, NewUser, Publisher, User, UserId,
    normalize_topic,
};

pub use traits::{
    ArticleSource, DeliverySink, FavoriteStore, NewsService, PluginAdapter, SentArticleLedger,
    SubscriptionRegistry, UserDirectory,
};
