// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for newsbot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for users,
//! topic subscriptions, per-user delivery history and favorite articles.

pub mod adapter;
pub mod database;
pub mod migrations;
mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
