//! src/repositories/sqlite/redemption.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::Error;
use crate::utils::time::{from_epoch_ms, to_epoch_ms};
use greenlit_common::models::{NewRedemption, Redemption};
use greenlit_common::traits::repository_traits::RedemptionRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, discord_id, system, license_key, roblox_id, verified_at, cooldown_ends_at
    FROM purchases
"#;

#[derive(Clone)]
pub struct SqliteRedemptionRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRedemptionRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, value: &str) -> Result<Vec<Redemption>, Error> {
        let sql = format!("{SELECT_COLUMNS} WHERE {clause} = ? ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for r in rows {
            results.push(row_to_redemption(&r)?);
        }
        Ok(results)
    }
}

fn row_to_redemption(r: &SqliteRow) -> Result<Redemption, Error> {
    Ok(Redemption {
        id: r.try_get("id")?,
        discord_id: r.try_get("discord_id")?,
        system: r.try_get("system")?,
        license_key: r.try_get("license_key")?,
        roblox_id: r.try_get("roblox_id")?,
        verified_at: from_epoch_ms(r.try_get::<i64, _>("verified_at")?),
        cooldown_ends_at: from_epoch_ms(r.try_get::<i64, _>("cooldown_ends_at")?),
    })
}

#[async_trait]
impl RedemptionRepository for SqliteRedemptionRepository {
    async fn insert_redemption(&self, new: &NewRedemption) -> Result<Redemption, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO purchases
                (discord_id, system, license_key, roblox_id, verified_at, cooldown_ends_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(&new.discord_id)
            .bind(&new.system)
            .bind(&new.license_key)
            .bind(&new.roblox_id)
            .bind(to_epoch_ms(new.verified_at))
            .bind(to_epoch_ms(new.cooldown_ends_at))
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(Redemption {
                id: done.last_insert_rowid(),
                discord_id: new.discord_id.clone(),
                system: new.system.clone(),
                license_key: new.license_key.clone(),
                roblox_id: new.roblox_id.clone(),
                verified_at: new.verified_at,
                cooldown_ends_at: new.cooldown_ends_at,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::Conflict(format!("license key '{}' already redeemed", new.license_key)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_key(&self, license_key: &str) -> Result<Option<Redemption>, Error> {
        Ok(self.fetch_where("license_key", license_key).await?.into_iter().next())
    }

    async fn list_for_account(&self, discord_id: &str) -> Result<Vec<Redemption>, Error> {
        self.fetch_where("discord_id", discord_id).await
    }

    async fn list_for_system(&self, system: &str) -> Result<Vec<Redemption>, Error> {
        self.fetch_where("system", system).await
    }

    async fn find_by_roblox_id(&self, roblox_id: &str) -> Result<Vec<Redemption>, Error> {
        self.fetch_where("roblox_id", roblox_id).await
    }

    async fn update_identity(
        &self,
        id: i64,
        roblox_id: &str,
        cooldown_ends_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let done = sqlx::query(
            r#"
            UPDATE purchases
               SET roblox_id = ?,
                   cooldown_ends_at = ?
             WHERE id = ?
            "#,
        )
            .bind(roblox_id)
            .bind(to_epoch_ms(cooldown_ends_at))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound(format!("redemption {id}")));
        }
        Ok(())
    }

    async fn delete_by_key(&self, license_key: &str) -> Result<bool, Error> {
        let done = sqlx::query("DELETE FROM purchases WHERE license_key = ?")
            .bind(license_key)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
