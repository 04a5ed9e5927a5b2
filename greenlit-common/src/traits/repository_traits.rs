use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{Account, AuditAction, AuditEvent, NewRedemption, Redemption};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Creates the account if absent; an existing row is left untouched.
    async fn ensure_account(&self, discord_id: &str, joined_at: DateTime<Utc>) -> Result<(), Error>;
    async fn set_roblox_id(&self, discord_id: &str, roblox_id: &str) -> Result<(), Error>;
    async fn get_account(&self, discord_id: &str) -> Result<Option<Account>, Error>;
}

#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    /// Fails with `Error::Conflict` when the license key is already on file.
    async fn insert_redemption(&self, new: &NewRedemption) -> Result<Redemption, Error>;
    async fn get_by_key(&self, license_key: &str) -> Result<Option<Redemption>, Error>;
    async fn list_for_account(&self, discord_id: &str) -> Result<Vec<Redemption>, Error>;
    async fn list_for_system(&self, system: &str) -> Result<Vec<Redemption>, Error>;
    async fn find_by_roblox_id(&self, roblox_id: &str) -> Result<Vec<Redemption>, Error>;
    async fn update_identity(
        &self,
        id: i64,
        roblox_id: &str,
        cooldown_ends_at: DateTime<Utc>,
    ) -> Result<(), Error>;
    /// Returns true when a row was removed.
    async fn delete_by_key(&self, license_key: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(
        &self,
        action: AuditAction,
        actor_id: Option<&str>,
        target_id: Option<&str>,
        system: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditEvent, Error>;

    /// Newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<AuditEvent>, Error>;
}
