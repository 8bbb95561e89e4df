// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Favorite article operations.

use chrono::Utc;
use newsbot_core::NewsbotError;
use newsbot_core::types::{Article, FavoriteArticle, UserId};
use rusqlite::params;

use crate::database::{Database, map_tr_err, to_sql_time};
use crate::models::{FAVORITE_COLUMNS, favorite_from_row};

/// Bookmarks `article` for `user_id`; a second add for the same URL is `Duplicate`.
pub async fn add_favorite(
    db: &Database,
    user_id: UserId,
    article: &Article,
) -> Result<(), NewsbotError> {
    let url = article.url.clone();
    let title = article.title.clone();
    let source = article.source.name.clone();
    let published_at = to_sql_time(&article.published_at);
    let added_at = to_sql_time(&Utc::now());

    let inserted = {
        let url = url.clone();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO favorite_articles
                     (user_id, article_url, title, source, published_at, added_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![user_id.0, url, title, source, published_at, added_at],
                )
            })
            .await
            .map_err(map_tr_err)?
    };
    if inserted == 0 {
        return Err(NewsbotError::Duplicate(format!("favorite {url}")));
    }
    Ok(())
}

pub async fn remove_favorite(db: &Database, user_id: UserId, url: &str) -> Result<(), NewsbotError> {
    let owned = url.to_string();
    let removed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM favorite_articles WHERE user_id = ?1 AND article_url = ?2",
                params![user_id.0, owned],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if removed == 0 {
        return Err(NewsbotError::NotFound(format!("favorite {url}")));
    }
    Ok(())
}

/// Favorites for `user_id`, newest first.
pub async fn list_favorites(
    db: &Database,
    user_id: UserId,
) -> Result<Vec<FavoriteArticle>, NewsbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FAVORITE_COLUMNS} FROM favorite_articles
                 WHERE user_id = ?1 ORDER BY added_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![user_id.0], favorite_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn is_favorite(db: &Database, user_id: UserId, url: &str) -> Result<bool, NewsbotError> {
    let url = url.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM favorite_articles WHERE user_id = ?1 AND article_url = ?2)",
                params![user_id.0, url],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
