// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod favorites;
pub mod sent_articles;
pub mod subscriptions;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use newsbot_core::types::{ChatId, NewUser, User};
    use tempfile::TempDir;

    use crate::database::Database;

    pub async fn setup_db() -> (Database, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    pub async fn make_user(db: &Database, chat_id: i64) -> User {
        super::users::find_or_create_user(
            db,
            NewUser {
                chat_id: ChatId(chat_id),
                username: Some(format!("user{chat_id}")),
                first_name: "Test".into(),
                last_name: None,
            },
        )
        .await
        .unwrap()
    }
}
