//! src/repositories/sqlite/account.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::Error;
use crate::utils::time::{from_epoch_ms, to_epoch_ms};
use greenlit_common::models::Account;
use greenlit_common::traits::repository_traits::AccountRepository;

#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAccountRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn ensure_account(&self, discord_id: &str, joined_at: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (discord_id, joined_at)
            VALUES (?, ?)
            "#,
        )
            .bind(discord_id)
            .bind(to_epoch_ms(joined_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_roblox_id(&self, discord_id: &str, roblox_id: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET roblox_id = ? WHERE discord_id = ?")
            .bind(roblox_id)
            .bind(discord_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_account(&self, discord_id: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query(
            r#"
            SELECT discord_id, roblox_id, joined_at
            FROM users
            WHERE discord_id = ?
            "#,
        )
            .bind(discord_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(Account {
                discord_id: r.try_get("discord_id")?,
                roblox_id: r.try_get("roblox_id")?,
                joined_at: from_epoch_ms(r.try_get::<i64, _>("joined_at")?),
            }))
        } else {
            Ok(None)
        }
    }
}
