//! src/repositories/sqlite/audit_log.rs
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::Error;
use crate::utils::time::{from_epoch_ms, to_epoch_ms};
use greenlit_common::models::{AuditAction, AuditEvent};
use greenlit_common::traits::repository_traits::AuditLogRepository;

#[derive(Clone)]
pub struct SqliteAuditLogRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAuditLogRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for SqliteAuditLogRepository {
    async fn append(
        &self,
        action: AuditAction,
        actor_id: Option<&str>,
        target_id: Option<&str>,
        system: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditEvent, Error> {
        let done = sqlx::query(
            r#"
            INSERT INTO logs (action_type, actor_id, target_id, system, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
            .bind(action.as_str())
            .bind(actor_id)
            .bind(target_id)
            .bind(system)
            .bind(to_epoch_ms(timestamp))
            .execute(&self.pool)
            .await?;

        Ok(AuditEvent {
            id: done.last_insert_rowid(),
            action,
            actor_id: actor_id.map(String::from),
            target_id: target_id.map(String::from),
            system: system.map(String::from),
            timestamp,
        })
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditEvent>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, action_type, actor_id, target_id, system, timestamp
            FROM logs
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::new();
        for r in rows {
            let action_str: String = r.try_get("action_type")?;
            results.push(AuditEvent {
                id: r.try_get("id")?,
                action: AuditAction::from_str(&action_str)?,
                actor_id: r.try_get("actor_id")?,
                target_id: r.try_get("target_id")?,
                system: r.try_get("system")?,
                timestamp: from_epoch_ms(r.try_get::<i64, _>("timestamp")?),
            });
        }
        Ok(results)
    }
}
