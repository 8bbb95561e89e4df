// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do not open a second connection for writes.

use std::path::Path;

use chrono::{DateTime, Utc};
use newsbot_core::NewsbotError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the newsbot SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, NewsbotError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`] with explicit journal mode selection.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, NewsbotError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| NewsbotError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;

        conn.call(move |conn| {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.pragma_update_and_check(None, "journal_mode", journal, |row| {
                row.get::<_, String>(0)
            })
            .map_err(storage_err)?;
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )
            .map_err(storage_err)?;
            run_migrations(conn)
        })
        .await
        .map_err(map_tr_app_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Query modules call through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), NewsbotError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)
    }

    /// Closes the connection, flushing pending work on the background thread.
    pub async fn close(self) -> Result<(), NewsbotError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

fn storage_err(e: rusqlite::Error) -> NewsbotError {
    NewsbotError::Storage {
        source: Box::new(e),
    }
}

/// Converts a tokio-rusqlite error from a plain rusqlite closure.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> NewsbotError {
    NewsbotError::Storage {
        source: Box::new(e),
    }
}

/// Converts a tokio-rusqlite error from a closure that already speaks
/// [`NewsbotError`], keeping the inner error intact.
pub fn map_tr_app_err(e: tokio_rusqlite::Error<NewsbotError>) -> NewsbotError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => NewsbotError::Storage {
            source: other.to_string().into(),
        },
    }
}

/// Formats a timestamp the way every table stores it.
pub(crate) fn to_sql_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parses a stored timestamp at column `idx`.
pub(crate) fn from_sql_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/newsbot.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     AND name NOT LIKE 'refinery_%' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
        assert_eq!(
            tables,
            vec!["favorite_articles", "sent_articles", "subscriptions", "users"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("newsbot.db");
        let path = path.to_str().unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.checkpoint().await.unwrap();
        db.close().await.unwrap();
    }

    #[test]
    fn timestamps_round_trip_at_millisecond_precision() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T10:20:30.456Z")
            .unwrap()
            .with_timezone(&Utc);
        let text = to_sql_time(&at);
        assert_eq!(text, "2026-03-01T10:20:30.456Z");
        assert_eq!(from_sql_time(0, &text).unwrap(), at);
        assert!(from_sql_time(0, "yesterday").is_err());
    }
}
