// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for newsbot.
//!
//! Provides in-memory and scripted suppliers for fast, deterministic tests
//! without SQLite, HTTP or Telegram.
//!
//! # Components
//!
//! - [`MemoryStore`] - in-memory users, subscriptions, history and favorites with failure injection
//! - [`MockSource`] - article source with per-topic scripted answers and a call log
//! - [`RecordingSink`] - delivery sink that captures deliveries and can be told to fail

pub mod fixtures;
pub mod memory_store;
pub mod mock_sink;
pub mod mock_source;

pub use fixtures::{article, article_aged, test_user};
pub use memory_store::MemoryStore;
pub use mock_sink::RecordingSink;
pub use mock_source::{MockSource, SourceBehavior};
