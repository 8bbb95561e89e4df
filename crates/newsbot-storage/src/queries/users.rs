// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use chrono::{DateTime, Utc};
use newsbot_core::NewsbotError;
use newsbot_core::types::{ChatId, NewUser, User, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err, to_sql_time};
use crate::models::{USER_COLUMNS, user_from_row};

/// Longest stored username or name, in characters.
const MAX_NAME_LENGTH: usize = 64;

fn clip(value: &str) -> String {
    value.chars().take(MAX_NAME_LENGTH).collect()
}

/// Returns the user registered for `new.chat_id`, inserting them first if
/// this is the first contact. Existing rows keep their stored names.
pub async fn find_or_create_user(db: &Database, new: NewUser) -> Result<User, NewsbotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (chat_id, username, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (chat_id) DO NOTHING",
                params![
                    new.chat_id.0,
                    new.username.as_deref().map(clip),
                    clip(&new.first_name),
                    new.last_name.as_deref().map(clip),
                ],
            )?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE chat_id = ?1"),
                params![new.chat_id.0],
                user_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user(db: &Database, user_id: UserId) -> Result<Option<User>, NewsbotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id.0],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user_by_chat(db: &Database, chat_id: ChatId) -> Result<Option<User>, NewsbotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE chat_id = ?1"),
                params![chat_id.0],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All registered users in registration order.
pub async fn list_users(db: &Database) -> Result<Vec<User>, NewsbotError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Runs a single-column `UPDATE users` and maps "no row" to `NotFound`.
async fn update_column(
    db: &Database,
    user_id: UserId,
    sql: &'static str,
    value: rusqlite::types::Value,
) -> Result<(), NewsbotError> {
    let changed = db
        .connection()
        .call(move |conn| conn.execute(sql, params![value, user_id.0]))
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(NewsbotError::NotFound(format!("user {user_id}")));
    }
    Ok(())
}

pub async fn update_last_notified(
    db: &Database,
    user_id: UserId,
    at: DateTime<Utc>,
) -> Result<(), NewsbotError> {
    update_column(
        db,
        user_id,
        "UPDATE users SET last_notified_at = ?1 WHERE id = ?2",
        to_sql_time(&at).into(),
    )
    .await
}

pub async fn update_interval(
    db: &Database,
    user_id: UserId,
    minutes: u32,
) -> Result<(), NewsbotError> {
    update_column(
        db,
        user_id,
        "UPDATE users SET interval_minutes = ?1 WHERE id = ?2",
        i64::from(minutes).into(),
    )
    .await
}

pub async fn update_news_limit(
    db: &Database,
    user_id: UserId,
    limit: u32,
) -> Result<(), NewsbotError> {
    update_column(
        db,
        user_id,
        "UPDATE users SET news_limit = ?1 WHERE id = ?2",
        i64::from(limit).into(),
    )
    .await
}

pub async fn set_state(db: &Database, user_id: UserId, state: &str) -> Result<(), NewsbotError> {
    update_column(
        db,
        user_id,
        "UPDATE users SET state = ?1 WHERE id = ?2",
        state.to_string().into(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{make_user, setup_db};

    #[tokio::test]
    async fn find_or_create_registers_once() {
        let (db, _dir) = setup_db().await;
        let first = make_user(&db, 42).await;
        assert_eq!(first.chat_id, ChatId(42));
        assert_eq!(first.interval_minutes, 60);
        assert_eq!(first.news_limit, 5);
        assert!(first.last_notified_at.is_none());

        let again = find_or_create_user(
            &db,
            NewUser {
                chat_id: ChatId(42),
                username: Some("renamed".into()),
                first_name: "Other".into(),
                last_name: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.username.as_deref(), Some("user42"));
        assert_eq!(list_users(&db).await.unwrap().len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn long_names_are_clipped() {
        let (db, _dir) = setup_db().await;
        let user = find_or_create_user(
            &db,
            NewUser {
                chat_id: ChatId(7),
                username: None,
                first_name: "x".repeat(100),
                last_name: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.first_name.chars().count(), 64);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn settings_updates_persist() {
        let (db, _dir) = setup_db().await;
        let user = make_user(&db, 1).await;
        let at = DateTime::parse_from_rfc3339("2026-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        update_interval(&db, user.id, 15).await.unwrap();
        update_news_limit(&db, user.id, 8).await.unwrap();
        update_last_notified(&db, user.id, at).await.unwrap();
        set_state(&db, user.id, "awaiting_topic").await.unwrap();

        let stored = get_user(&db, user.id).await.unwrap().unwrap();
        assert_eq!(stored.interval_minutes, 15);
        assert_eq!(stored.news_limit, 8);
        assert_eq!(stored.last_notified_at, Some(at));
        assert_eq!(stored.state, "awaiting_topic");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn updating_missing_user_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_news_limit(&db, UserId(999), 3).await.unwrap_err();
        assert!(matches!(err, NewsbotError::NotFound(_)));
        assert!(get_user_by_chat(&db, ChatId(999)).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
