//! `UserDirectory` over the `users` table.

use async_trait::async_trait;
use rf_core::models::{Role, User, UserId};
use rf_core::traits::UserDirectory;
use sqlx::Row;

use crate::SqliteForumStore;

#[async_trait]
impl UserDirectory for SqliteForumStore {
    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, role, banned FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(User {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                role: row.try_get::<String, _>("role")?.parse()?,
                banned: row.try_get("banned")?,
            })),
            None => Ok(None),
        }
    }

    async fn create_user(&self, username: &str, role: Role) -> anyhow::Result<UserId> {
        let result = sqlx::query("INSERT INTO users (username, role) VALUES (?, ?)")
            .bind(username)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn set_banned(&self, id: UserId, banned: bool) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET banned = ? WHERE id = ?")
            .bind(banned)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
