// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic subscription operations.
//!
//! Topics are normalized (trimmed, lowercased) before every write and lookup.

use newsbot_core::types::{ChatId, UserId, normalize_topic};
use newsbot_core::NewsbotError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Subscribes `user_id` to `topic`, failing with `Duplicate` if already subscribed.
pub async fn add_subscription(
    db: &Database,
    user_id: UserId,
    topic: &str,
) -> Result<(), NewsbotError> {
    let topic = normalize_topic(topic);
    let inserted = {
        let topic = topic.clone();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO subscriptions (user_id, topic) VALUES (?1, ?2)",
                    params![user_id.0, topic],
                )
            })
            .await
            .map_err(map_tr_err)?
    };
    if inserted == 0 {
        return Err(NewsbotError::Duplicate(format!("subscription to `{topic}`")));
    }
    Ok(())
}

pub async fn remove_subscription(
    db: &Database,
    user_id: UserId,
    topic: &str,
) -> Result<(), NewsbotError> {
    let topic = normalize_topic(topic);
    let removed = {
        let topic = topic.clone();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM subscriptions WHERE user_id = ?1 AND topic = ?2",
                    params![user_id.0, topic],
                )
            })
            .await
            .map_err(map_tr_err)?
    };
    if removed == 0 {
        return Err(NewsbotError::NotFound(format!("subscription to `{topic}`")));
    }
    Ok(())
}

/// Topics for one user in the order they subscribed.
pub async fn list_topics(db: &Database, user_id: UserId) -> Result<Vec<String>, NewsbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT topic FROM subscriptions WHERE user_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map(params![user_id.0], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_unique_topics(db: &Database) -> Result<Vec<String>, NewsbotError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT topic FROM subscriptions ORDER BY topic")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Chats of every user subscribed to `topic`.
pub async fn subscribers_for_topic(db: &Database, topic: &str) -> Result<Vec<ChatId>, NewsbotError> {
    let topic = normalize_topic(topic);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT users.chat_id FROM subscriptions
                 JOIN users ON users.id = subscriptions.user_id
                 WHERE subscriptions.topic = ?1 ORDER BY users.id",
            )?;
            let rows = stmt.query_map(params![topic], |row| row.get(0).map(ChatId))?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Rewrites rows stored before topics were normalized.
///
/// A legacy row whose normalized form already exists for the same user is
/// deleted instead. Returns the number of rows rewritten or removed.
pub async fn normalize_topics(db: &Database) -> Result<usize, NewsbotError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;
            let legacy: Vec<(i64, String)> = {
                let mut stmt = tx.prepare("SELECT id, topic FROM subscriptions")?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?;
                rows.filter_map(|row| match row {
                    Ok((id, topic)) => {
                        let normalized = normalize_topic(&topic);
                        (normalized != topic).then_some(Ok((id, normalized)))
                    }
                    Err(e) => Some(Err(e)),
                })
                .collect::<Result<_, _>>()?
            };

            for (id, normalized) in &legacy {
                let updated = tx.execute(
                    "UPDATE OR IGNORE subscriptions SET topic = ?1 WHERE id = ?2",
                    params![normalized, id],
                )?;
                if updated == 0 {
                    tx.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;
                }
            }
            tx.commit()?;
            Ok(legacy.len())
        })
        .await
        .map_err(map_tr_err)
}
