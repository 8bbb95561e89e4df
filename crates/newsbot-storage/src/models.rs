// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite tables and the core domain types.

use newsbot_core::types::{ChatId, FavoriteArticle, User, UserId};
use rusqlite::Row;

use crate::database::from_sql_time;

/// Column list matching [`user_from_row`].
pub(crate) const USER_COLUMNS: &str = "id, chat_id, username, first_name, last_name, state, \
     interval_minutes, news_limit, last_notified_at";

/// Column list matching [`favorite_from_row`].
pub(crate) const FAVORITE_COLUMNS: &str =
    "id, user_id, article_url, title, source, published_at, added_at";

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let last_notified_at: Option<String> = row.get(8)?;
    Ok(User {
        id: UserId(row.get(0)?),
        chat_id: ChatId(row.get(1)?),
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        state: row.get(5)?,
        interval_minutes: row.get(6)?,
        news_limit: row.get(7)?,
        last_notified_at: last_notified_at
            .map(|raw| from_sql_time(8, &raw))
            .transpose()?,
    })
}

pub(crate) fn favorite_from_row(row: &Row<'_>) -> rusqlite::Result<FavoriteArticle> {
    let published_at: String = row.get(5)?;
    let added_at: String = row.get(6)?;
    Ok(FavoriteArticle {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        article_url: row.get(2)?,
        title: row.get(3)?,
        source: row.get(4)?,
        published_at: from_sql_time(5, &published_at)?,
        added_at: from_sql_time(6, &added_at)?,
    })
}
