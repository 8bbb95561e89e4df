// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user delivery history.

use chrono::Utc;
use newsbot_core::NewsbotError;
use newsbot_core::types::UserId;
use rusqlite::params;

use crate::database::{Database, map_tr_err, to_sql_time};

pub async fn is_sent(db: &Database, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
    let url = url.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM sent_articles WHERE user_id = ?1 AND article_url = ?2)",
                params![user_id.0, url],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Records `url` for `user_id`. Returns `true` only if this call inserted it.
pub async fn mark_sent(db: &Database, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
    let url = url.to_string();
    let sent_at = to_sql_time(&Utc::now());
    let inserted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO sent_articles (user_id, article_url, sent_at)
                 VALUES (?1, ?2, ?3)",
                params![user_id.0, url, sent_at],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(inserted == 1)
}

/// Deletes the whole history for `user_id`, returning how many rows went.
pub async fn reset_history(db: &Database, user_id: UserId) -> Result<usize, NewsbotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM sent_articles WHERE user_id = ?1",
                params![user_id.0],
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{make_user, setup_db};

    #[tokio::test]
    async fn mark_sent_claims_exactly_once() {
        let (db, _dir) = setup_db().await;
        let user = make_user(&db, 1).await;

        assert!(!is_sent(&db, user.id, "https://a.example/1").await.unwrap());
        assert!(mark_sent(&db, user.id, "https://a.example/1").await.unwrap());
        assert!(!mark_sent(&db, user.id, "https://a.example/1").await.unwrap());
        assert!(is_sent(&db, user.id, "https://a.example/1").await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn history_is_per_user() {
        let (db, _dir) = setup_db().await;
        let a = make_user(&db, 1).await;
        let b = make_user(&db, 2).await;

        mark_sent(&db, a.id, "https://a.example/1").await.unwrap();
        assert!(!is_sent(&db, b.id, "https://a.example/1").await.unwrap());
        assert!(mark_sent(&db, b.id, "https://a.example/1").await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reset_clears_only_that_user() {
        let (db, _dir) = setup_db().await;
        let a = make_user(&db, 1).await;
        let b = make_user(&db, 2).await;

        mark_sent(&db, a.id, "https://a.example/1").await.unwrap();
        mark_sent(&db, a.id, "https://a.example/2").await.unwrap();
        mark_sent(&db, b.id, "https://a.example/1").await.unwrap();

        assert_eq!(reset_history(&db, a.id).await.unwrap(), 2);
        assert!(!is_sent(&db, a.id, "https://a.example/1").await.unwrap());
        assert!(is_sent(&db, b.id, "https://a.example/1").await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let (db, _dir) = setup_db().await;
        let user = make_user(&db, 1).await;

        let user_id = user.id;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                mark_sent(&db, user_id, "https://a.example/race").await.unwrap()
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        db.close().await.unwrap();
    }
}
