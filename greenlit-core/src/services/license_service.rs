// File: greenlit-core/src/services/license_service.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{error, info, warn};

use crate::Database;
use crate::Error;
use crate::platforms::{GroupApi, GuildApi, LicenseVerifier};
use crate::repositories::{
    AccountRepository, RedemptionRepository, SqliteAccountRepository, SqliteAuditLogRepository,
    SqliteRedemptionRepository,
};
use crate::services::{AuditService, RequestContext};
use crate::stores::{AllowListStore, DataStores, PendingLedger, SettingsStore};
use crate::utils::time::{cooldown_period, days_remaining, to_epoch_ms};
use greenlit_common::LicenseError;
use greenlit_common::models::{
    Account, AuditAction, AuditEvent, GENERATED_LOCALLY, LogSettings, NewRedemption, PendingGrant,
    Redemption, SystemCatalog, SystemDefinition,
};

/// Prefix of keys minted by `/generate_key`; these skip remote verification.
pub const GENERATED_KEY_PREFIX: &str = "GEN-";

/// How a revocation target was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeTarget {
    License { license_key: String, system: String },
    Accounts { discord_ids: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct RevokeOutcome {
    pub target: RevokeTarget,
    pub system_filter: Option<String>,
    pub revoked: Vec<Redemption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSyncReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RoleSyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StatusView {
    pub account: Option<Account>,
    pub redemptions: Vec<Redemption>,
}

/// Every user-facing operation of the bot. Slash commands only parse options
/// and format replies; all reads and writes go through here.
pub struct LicenseService {
    catalog: Arc<SystemCatalog>,
    accounts: Arc<dyn AccountRepository>,
    redemptions: Arc<dyn RedemptionRepository>,
    audit: AuditService,
    allow_lists: Arc<AllowListStore>,
    ledger: Arc<PendingLedger>,
    settings: Arc<SettingsStore>,
    verifier: Arc<dyn LicenseVerifier>,
    guild: Arc<dyn GuildApi>,
    groups: Arc<dyn GroupApi>,
}

impl LicenseService {
    pub fn new(
        catalog: Arc<SystemCatalog>,
        db: &Database,
        stores: DataStores,
        verifier: Arc<dyn LicenseVerifier>,
        guild: Arc<dyn GuildApi>,
        groups: Arc<dyn GroupApi>,
    ) -> Self {
        let pool = db.pool().clone();
        Self {
            catalog,
            accounts: Arc::new(SqliteAccountRepository::new(pool.clone())),
            redemptions: Arc::new(SqliteRedemptionRepository::new(pool.clone())),
            audit: AuditService::new(Arc::new(SqliteAuditLogRepository::new(pool)), guild.clone()),
            allow_lists: stores.allow_lists,
            ledger: stores.ledger,
            settings: stores.settings,
            verifier,
            guild,
            groups,
        }
    }

    pub fn catalog(&self) -> &SystemCatalog {
        &self.catalog
    }

    pub fn redemptions(&self) -> &Arc<dyn RedemptionRepository> {
        &self.redemptions
    }

    /// Snapshot of settings and clock for one command invocation.
    pub async fn request_context(&self, actor_id: &str, is_admin: bool) -> RequestContext {
        RequestContext::new(actor_id, is_admin, self.settings.load().await)
    }

    fn resolve_system(&self, name: &str) -> Result<&SystemDefinition, LicenseError> {
        self.catalog
            .find(name)
            .ok_or_else(|| LicenseError::UnknownSystem(name.trim().to_string()))
    }

    // ---------------------------------------------------------------
    // Redemption
    // ---------------------------------------------------------------

    /// Redeems a pending key for the caller. Checks run in a fixed order
    /// (ledger, verifier, duplicate key, cooldown) and the first failure wins.
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        roblox_id: &str,
        license_key: &str,
    ) -> Result<(Redemption, SystemDefinition), LicenseError> {
        let roblox_id = roblox_id.trim();
        let license_key = license_key.trim();

        let pending = self
            .ledger
            .get(license_key)
            .await?
            .ok_or(LicenseError::KeyNotRecognized)?;
        let system = self.resolve_system(&pending.system)?.clone();

        if !license_key.starts_with(GENERATED_KEY_PREFIX) {
            match self.verifier.verify(&system.name, license_key).await {
                Ok(true) => {}
                Ok(false) => return Err(LicenseError::KeyInvalid),
                Err(e) => {
                    warn!("License verification failed for '{}': {}", system.name, e);
                    return Err(LicenseError::VerifierUnavailable);
                }
            }
        }

        if self.redemptions.get_by_key(license_key).await?.is_some() {
            return Err(LicenseError::AlreadyRedeemed);
        }

        let owned = self.owned_for_system(&ctx.actor_id, &system.name).await?;
        self.check_cooldown(ctx, &system, &owned)?;

        self.accounts.ensure_account(&ctx.actor_id, ctx.now).await?;
        let redemption = self
            .insert(NewRedemption {
                discord_id: ctx.actor_id.clone(),
                system: system.name.clone(),
                license_key: license_key.to_string(),
                roblox_id: roblox_id.to_string(),
                verified_at: ctx.now,
                cooldown_ends_at: ctx.now + cooldown_period(),
            })
            .await?;
        // Only the winner of a race on the same key may touch the account.
        self.accounts.set_roblox_id(&ctx.actor_id, roblox_id).await?;

        self.allow_lists.add(&system, roblox_id).await?;
        self.ledger.remove(license_key).await?;

        let message = format!(
            "✅ **WHITELIST_REDEEMED**: <@{}> (Roblox ID: {}) redeemed `{}` for **{}**.",
            ctx.actor_id, roblox_id, license_key, system.name
        );
        self.audit
            .record(ctx, AuditAction::Redeemed, Some(roblox_id), Some(&system.name), &message)
            .await?;

        self.grant_role(&ctx.actor_id, &system).await;
        info!("{} redeemed a license for '{}'", ctx.actor_id, system.name);
        Ok((redemption, system))
    }

    /// Rebinds the caller's grants on `system` to `new_roblox_id` once their
    /// cooldown has run out.
    pub async fn update_identity(
        &self,
        ctx: &RequestContext,
        system: &str,
        new_roblox_id: &str,
    ) -> Result<(SystemDefinition, Vec<Redemption>), LicenseError> {
        let new_roblox_id = new_roblox_id.trim();
        let system = self.resolve_system(system)?.clone();

        let owned = self.owned_for_system(&ctx.actor_id, &system.name).await?;
        if owned.is_empty() {
            return Err(LicenseError::NoRedemption(system.name.clone()));
        }
        self.check_cooldown(ctx, &system, &owned)?;

        let cooldown_ends_at = ctx.now + cooldown_period();
        let mut updated = Vec::with_capacity(owned.len());
        for row in &owned {
            self.redemptions
                .update_identity(row.id, new_roblox_id, cooldown_ends_at)
                .await?;
            updated.push(Redemption {
                roblox_id: new_roblox_id.to_string(),
                cooldown_ends_at,
                ..row.clone()
            });
        }
        self.accounts.set_roblox_id(&ctx.actor_id, new_roblox_id).await?;

        let old_ids: BTreeSet<&str> = owned.iter().map(|r| r.roblox_id.as_str()).collect();
        let mut stale = Vec::new();
        for old in old_ids {
            if old != new_roblox_id && !self.still_referenced(&system.name, old).await? {
                stale.push(old.to_string());
            }
        }
        self.allow_lists.replace(&system, &stale, new_roblox_id).await?;

        let message = format!(
            "🔄 **WHITELIST_UPDATED**: <@{}> changed their Roblox ID for **{}** to {}.",
            ctx.actor_id, system.name, new_roblox_id
        );
        self.audit
            .record(ctx, AuditAction::Updated, Some(new_roblox_id), Some(&system.name), &message)
            .await?;
        Ok((system, updated))
    }

    // ---------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------

    /// Resolves `target` as a license key, then a Discord id, then a Roblox
    /// id, and removes every matching grant.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        target: &str,
        system_filter: Option<&str>,
    ) -> Result<RevokeOutcome, LicenseError> {
        ctx.require_admin()?;
        let target = target.trim();
        let system_filter = match system_filter {
            Some(name) => Some(self.resolve_system(name)?.name.clone()),
            None => None,
        };

        if let Some(row) = self.redemptions.get_by_key(target).await? {
            if let Some(filter) = &system_filter {
                if &row.system != filter {
                    return Err(LicenseError::SystemMismatch {
                        license_system: row.system.clone(),
                        requested: filter.clone(),
                    });
                }
            }
            self.revoke_one(ctx, &row).await?;
            return Ok(RevokeOutcome {
                target: RevokeTarget::License {
                    license_key: row.license_key.clone(),
                    system: row.system.clone(),
                },
                system_filter,
                revoked: vec![row],
            });
        }

        let discord_ids = self.resolve_owners(target).await?;
        let mut matched = Vec::new();
        for discord_id in &discord_ids {
            matched.extend(self.redemptions.list_for_account(discord_id).await?);
        }
        if matched.is_empty() {
            return Err(LicenseError::NoEntries);
        }
        if let Some(filter) = &system_filter {
            matched.retain(|r| &r.system == filter);
            if matched.is_empty() {
                return Err(LicenseError::NoEntriesForSystem(filter.clone()));
            }
        }

        for row in &matched {
            self.revoke_one(ctx, row).await?;
        }
        Ok(RevokeOutcome {
            target: RevokeTarget::Accounts { discord_ids },
            system_filter,
            revoked: matched,
        })
    }

    /// Grants `system` to `roblox_id` without a key, recorded under the admin.
    pub async fn force_grant(
        &self,
        ctx: &RequestContext,
        roblox_id: &str,
        system: &str,
    ) -> Result<(Redemption, SystemDefinition), LicenseError> {
        ctx.require_admin()?;
        let roblox_id = roblox_id.trim();
        let system = self.resolve_system(system)?.clone();

        self.accounts.ensure_account(&ctx.actor_id, ctx.now).await?;
        let license_key = forced_key(&system.name, roblox_id, to_epoch_ms(ctx.now));
        let redemption = self
            .insert(NewRedemption {
                discord_id: ctx.actor_id.clone(),
                system: system.name.clone(),
                license_key,
                roblox_id: roblox_id.to_string(),
                verified_at: ctx.now,
                cooldown_ends_at: ctx.now + cooldown_period(),
            })
            .await?;

        self.allow_lists.add(&system, roblox_id).await?;

        let message = format!(
            "🛠️ **FORCE_WHITELIST**: <@{}> manually whitelisted {} for **{}**.",
            ctx.actor_id, roblox_id, system.name
        );
        self.audit
            .record(ctx, AuditAction::ForceGranted, Some(roblox_id), Some(&system.name), &message)
            .await?;

        self.grant_role(&ctx.actor_id, &system).await;
        Ok((redemption, system))
    }

    /// Mints a `GEN-` key for `system` and places it in the ledger.
    pub async fn generate_key(&self, ctx: &RequestContext, system: &str) -> Result<(String, SystemDefinition), LicenseError> {
        ctx.require_admin()?;
        let system = self.resolve_system(system)?.clone();
        let key = mint_generated_key(&system.name);

        self.ledger
            .insert(
                &key,
                PendingGrant {
                    email: Some(GENERATED_LOCALLY.to_string()),
                    system: system.name.clone(),
                    timestamp: ctx.now,
                },
            )
            .await?;

        let message = format!(
            "🔑 **KEY_GENERATED**: <@{}> generated a key for **{}**.",
            ctx.actor_id, system.name
        );
        self.audit
            .record(ctx, AuditAction::KeyGenerated, Some(&key), Some(&system.name), &message)
            .await?;
        Ok((key, system))
    }

    // ---------------------------------------------------------------
    // Roles and group membership
    // ---------------------------------------------------------------

    /// Makes the caller's guild roles match the systems they own.
    pub async fn sync_roles(&self, ctx: &RequestContext) -> Result<RoleSyncReport, LicenseError> {
        let owned: BTreeSet<String> = self
            .redemptions
            .list_for_account(&ctx.actor_id)
            .await?
            .into_iter()
            .map(|r| r.system)
            .collect();

        let roles = match self.guild.member_roles(&ctx.actor_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("Could not fetch member {}: {}", ctx.actor_id, e);
                return Err(LicenseError::MemberUnavailable);
            }
        };

        let mut report = RoleSyncReport::default();
        for system in self.catalog.iter() {
            let has_role = roles.iter().any(|r| r == &system.role_id);
            let should_have = owned.contains(&system.name);

            if should_have && !has_role {
                match self.guild.add_role(&ctx.actor_id, &system.role_id).await {
                    Ok(()) => report.added.push(system.name.clone()),
                    Err(e) => warn!("Failed to add role for {} to {}: {}", system.name, ctx.actor_id, e),
                }
            } else if !should_have && has_role {
                match self.guild.remove_role(&ctx.actor_id, &system.role_id).await {
                    Ok(()) => report.removed.push(system.name.clone()),
                    Err(e) => warn!("Failed to remove role for {} from {}: {}", system.name, ctx.actor_id, e),
                }
            }
        }
        Ok(report)
    }

    /// Accepts the caller's pending join request to the system's Roblox group.
    pub async fn accept_join(&self, ctx: &RequestContext, system: &str) -> Result<SystemDefinition, LicenseError> {
        let system = self.resolve_system(system)?.clone();
        let api_key = system
            .group_api_key
            .clone()
            .ok_or_else(|| LicenseError::MissingGroupCredential(system.name.clone()))?;

        let roblox_id = self
            .accounts
            .get_account(&ctx.actor_id)
            .await?
            .and_then(|a| a.roblox_id)
            .ok_or(LicenseError::NoIdentity)?;

        if let Err(e) = self
            .groups
            .accept_join_request(&system.group_id, &roblox_id, &api_key)
            .await
        {
            error!("Error accepting join request for {} into '{}': {}", roblox_id, system.name, e);
            return Err(LicenseError::JoinFailed(system.name.clone()));
        }

        let message = format!(
            "✅ **JOIN_ACCEPTED**: <@{}> (Roblox ID: {}) was accepted into **{}** group.",
            ctx.actor_id, roblox_id, system.name
        );
        self.audit
            .record(ctx, AuditAction::JoinAccepted, Some(&roblox_id), Some(&system.name), &message)
            .await?;
        Ok(system)
    }

    // ---------------------------------------------------------------
    // Read-only views
    // ---------------------------------------------------------------

    pub async fn status(&self, ctx: &RequestContext) -> Result<StatusView, LicenseError> {
        let account = self.accounts.get_account(&ctx.actor_id).await?;
        let redemptions = match &account {
            Some(_) => self.redemptions.list_for_account(&ctx.actor_id).await?,
            None => Vec::new(),
        };
        Ok(StatusView { account, redemptions })
    }

    pub async fn history(&self, ctx: &RequestContext) -> Result<Vec<Redemption>, LicenseError> {
        Ok(self.redemptions.list_for_account(&ctx.actor_id).await?)
    }

    /// Every grant held by whoever `target` resolves to.
    pub async fn view_entries(&self, ctx: &RequestContext, target: &str) -> Result<Vec<Redemption>, LicenseError> {
        ctx.require_admin()?;
        let target = target.trim();
        let discord_ids = match self.redemptions.get_by_key(target).await? {
            Some(row) => vec![row.discord_id],
            None => self.resolve_owners(target).await?,
        };

        let mut rows = Vec::new();
        for discord_id in &discord_ids {
            rows.extend(self.redemptions.list_for_account(discord_id).await?);
        }
        if rows.is_empty() {
            return Err(LicenseError::NoEntries);
        }
        Ok(rows)
    }

    pub async fn recent_logs(&self, ctx: &RequestContext, limit: Option<i64>) -> Result<Vec<AuditEvent>, LicenseError> {
        ctx.require_admin()?;
        Ok(self.audit.recent(limit.unwrap_or(10)).await?)
    }

    // ---------------------------------------------------------------
    // Log settings
    // ---------------------------------------------------------------

    pub async fn set_log_channel(&self, ctx: &RequestContext, channel_id: &str) -> Result<LogSettings, LicenseError> {
        ctx.require_admin()?;
        Ok(self.settings.set_channel(channel_id).await?)
    }

    pub async fn set_logs_enabled(&self, ctx: &RequestContext, enabled: bool) -> Result<LogSettings, LicenseError> {
        ctx.require_admin()?;
        Ok(self.settings.set_enabled(enabled).await?)
    }

    pub fn log_settings(&self, ctx: &RequestContext) -> Result<LogSettings, LicenseError> {
        ctx.require_admin()?;
        Ok(ctx.settings.clone())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    async fn owned_for_system(&self, discord_id: &str, system: &str) -> Result<Vec<Redemption>, Error> {
        let mut rows = self.redemptions.list_for_account(discord_id).await?;
        rows.retain(|r| r.system == system);
        Ok(rows)
    }

    fn check_cooldown(
        &self,
        ctx: &RequestContext,
        system: &SystemDefinition,
        owned: &[Redemption],
    ) -> Result<(), LicenseError> {
        let latest = owned
            .iter()
            .filter(|r| r.cooldown_active(ctx.now))
            .map(|r| r.cooldown_ends_at)
            .max();
        match latest {
            Some(until) => Err(LicenseError::CooldownActive {
                system: system.name.clone(),
                days: days_remaining(until, ctx.now),
            }),
            None => Ok(()),
        }
    }

    async fn insert(&self, new: NewRedemption) -> Result<Redemption, LicenseError> {
        match self.redemptions.insert_redemption(&new).await {
            Ok(row) => Ok(row),
            Err(Error::Conflict(_)) => Err(LicenseError::AlreadyRedeemed),
            Err(e) => Err(e.into()),
        }
    }

    /// Discord ids for `target`: the account itself if one exists, else the
    /// owners of any grant bound to that Roblox id.
    async fn resolve_owners(&self, target: &str) -> Result<Vec<String>, LicenseError> {
        if self.accounts.get_account(target).await?.is_some() {
            return Ok(vec![target.to_string()]);
        }
        let owners: BTreeSet<String> = self
            .redemptions
            .find_by_roblox_id(target)
            .await?
            .into_iter()
            .map(|r| r.discord_id)
            .collect();
        if owners.is_empty() {
            return Err(LicenseError::TargetNotFound);
        }
        Ok(owners.into_iter().collect())
    }

    async fn still_referenced(&self, system: &str, roblox_id: &str) -> Result<bool, Error> {
        Ok(self
            .redemptions
            .list_for_system(system)
            .await?
            .iter()
            .any(|r| r.roblox_id == roblox_id))
    }

    async fn revoke_one(&self, ctx: &RequestContext, row: &Redemption) -> Result<(), LicenseError> {
        self.redemptions.delete_by_key(&row.license_key).await?;

        match self.catalog.find(&row.system) {
            Some(system) => {
                if !self.still_referenced(&system.name, &row.roblox_id).await? {
                    self.allow_lists.remove(system, &row.roblox_id).await?;
                }
                let still_owns = !self.owned_for_system(&row.discord_id, &system.name).await?.is_empty();
                if !still_owns {
                    if let Err(e) = self.guild.remove_role(&row.discord_id, &system.role_id).await {
                        warn!("Could not remove role for {}: {}", row.discord_id, e);
                    }
                }
            }
            None => warn!("Revoked grant for unknown system '{}'; allow-list left as is", row.system),
        }

        let message = format!(
            "❌ **REVOKE**: <@{}> revoked **{}** from <@{}> (license: `{}`).",
            ctx.actor_id, row.system, row.discord_id, row.license_key
        );
        self.audit
            .record(ctx, AuditAction::Revoked, Some(&row.roblox_id), Some(&row.system), &message)
            .await?;
        Ok(())
    }

    async fn grant_role(&self, discord_id: &str, system: &SystemDefinition) {
        if let Err(e) = self.guild.add_role(discord_id, &system.role_id).await {
            warn!("Could not assign role for '{}' to {}: {}", system.name, discord_id, e);
        }
    }
}

/// `GEN-<system>-XXXX-XXXX-XXXX-XXXX` with four random upper-hex segments.
pub fn mint_generated_key(system: &str) -> String {
    let mut rng = rand::rng();
    let segments: Vec<String> = (0..4).map(|_| format!("{:04X}", rng.random::<u16>())).collect();
    format!("{GENERATED_KEY_PREFIX}{}-{}", system, segments.join("-"))
}

/// Synthetic key recorded for admin grants.
pub fn forced_key(system: &str, roblox_id: &str, now_ms: i64) -> String {
    let sanitized: String = system
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("FORCE-{sanitized}-{roblox_id}-{now_ms}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{MockGroupApi, MockGuildApi, MockLicenseVerifier};
    use chrono::Utc;

    struct Fixture {
        service: LicenseService,
        _dir: tempfile::TempDir,
    }

    async fn fixture(
        verifier: MockLicenseVerifier,
        guild: MockGuildApi,
        groups: MockGroupApi,
    ) -> Fixture {
        let db = Database::new(":memory:").await.unwrap();
        db.migrate().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let catalog = SystemCatalog::default().with_group_keys(|var| {
            (var == "APIKEY_LIGHTSABERS").then(|| "group-secret".to_string())
        });
        let service = LicenseService::new(
            Arc::new(catalog),
            &db,
            DataStores::open(dir.path()),
            Arc::new(verifier),
            Arc::new(guild),
            Arc::new(groups),
        );
        Fixture { service, _dir: dir }
    }

    fn quiet_guild() -> MockGuildApi {
        let mut guild = MockGuildApi::new();
        guild.expect_add_role().returning(|_, _| Ok(()));
        guild.expect_remove_role().returning(|_, _| Ok(()));
        guild
    }

    fn pending(system: &str) -> PendingGrant {
        PendingGrant { email: Some("buyer@example.com".into()), system: system.into(), timestamp: Utc::now() }
    }

    #[test]
    fn generated_keys_have_four_hex_segments() {
        let key = mint_generated_key("Lightsabers");
        let parts: Vec<&str> = key.split('-').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], "GEN");
        assert_eq!(parts[1], "Lightsabers");
        for seg in &parts[2..] {
            assert_eq!(seg.len(), 4);
            assert!(seg.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn forced_key_replaces_whitespace() {
        assert_eq!(forced_key("Ship System", "111", 5), "FORCE-Ship_System-111-5");
    }

    #[tokio::test]
    async fn verifier_rejection_leaves_ledger_alone() {
        let mut verifier = MockLicenseVerifier::new();
        verifier.expect_verify().times(1).returning(|_, _| Ok(false));
        let f = fixture(verifier, MockGuildApi::new(), MockGroupApi::new()).await;
        f.service.ledger.insert("PAY-1", pending("Blasters")).await.unwrap();

        let ctx = RequestContext::new("10", false, LogSettings::default());
        let err = f.service.redeem(&ctx, "111", "PAY-1").await.unwrap_err();
        assert!(matches!(err, LicenseError::KeyInvalid));
        assert!(f.service.ledger.contains("PAY-1").await.unwrap());
    }

    #[tokio::test]
    async fn verifier_outage_is_reported_as_unavailable() {
        let mut verifier = MockLicenseVerifier::new();
        verifier
            .expect_verify()
            .returning(|_, _| Err(Error::Platform("timeout".into())));
        let f = fixture(verifier, MockGuildApi::new(), MockGroupApi::new()).await;
        f.service.ledger.insert("PAY-2", pending("Blasters")).await.unwrap();

        let ctx = RequestContext::new("10", false, LogSettings::default());
        let err = f.service.redeem(&ctx, "111", "PAY-2").await.unwrap_err();
        assert!(matches!(err, LicenseError::VerifierUnavailable));
    }

    #[tokio::test]
    async fn role_grant_failure_does_not_fail_redeem() {
        let mut verifier = MockLicenseVerifier::new();
        verifier.expect_verify().times(0);
        let mut guild = MockGuildApi::new();
        guild
            .expect_add_role()
            .times(1)
            .returning(|_, _| Err(Error::Platform("missing permissions".into())));
        let f = fixture(verifier, guild, MockGroupApi::new()).await;
        f.service.ledger.insert("GEN-Blasters-0000-0000-0000-0001", pending("Blasters")).await.unwrap();

        let ctx = RequestContext::new("10", false, LogSettings::default());
        let (row, system) = f
            .service
            .redeem(&ctx, "111", "GEN-Blasters-0000-0000-0000-0001")
            .await
            .unwrap();
        assert_eq!(row.system, "Blasters");
        assert_eq!(system.name, "Blasters");
    }

    #[tokio::test]
    async fn admin_commands_reject_members() {
        let f = fixture(MockLicenseVerifier::new(), MockGuildApi::new(), MockGroupApi::new()).await;
        let ctx = RequestContext::new("10", false, LogSettings::default());
        assert!(matches!(f.service.generate_key(&ctx, "Speeders").await, Err(LicenseError::AdminOnly)));
        assert!(matches!(f.service.revoke(&ctx, "111", None).await, Err(LicenseError::AdminOnly)));
        assert!(matches!(f.service.force_grant(&ctx, "111", "Speeders").await, Err(LicenseError::AdminOnly)));
        assert!(matches!(f.service.recent_logs(&ctx, None).await, Err(LicenseError::AdminOnly)));
    }

    #[tokio::test]
    async fn role_sync_adds_and_removes() {
        let mut guild = MockGuildApi::new();
        // holds the Speeders role but owns nothing but Blasters
        guild
            .expect_member_roles()
            .returning(|_| Ok(vec!["1379224887071084620".to_string()]));
        guild
            .expect_add_role()
            .withf(|user, role| user == "10" && role == "1379224887071084617")
            .returning(|_, _| Ok(()));
        guild
            .expect_remove_role()
            .withf(|user, role| user == "10" && role == "1379224887071084620")
            .times(1)
            .returning(|_, _| Ok(()));
        let f = fixture(MockLicenseVerifier::new(), guild, MockGroupApi::new()).await;

        let admin = RequestContext::new("10", true, LogSettings::default());
        f.service.force_grant(&admin, "111", "Blasters").await.unwrap();

        let report = f.service.sync_roles(&admin).await.unwrap();
        assert_eq!(report.added, vec!["Blasters".to_string()]);
        assert_eq!(report.removed, vec!["Speeders".to_string()]);
    }

    #[tokio::test]
    async fn role_sync_reports_member_fetch_failure() {
        let mut guild = MockGuildApi::new();
        guild
            .expect_member_roles()
            .returning(|_| Err(Error::Platform("unknown member".into())));
        let f = fixture(MockLicenseVerifier::new(), guild, MockGroupApi::new()).await;

        let ctx = RequestContext::new("10", false, LogSettings::default());
        assert!(matches!(f.service.sync_roles(&ctx).await, Err(LicenseError::MemberUnavailable)));
    }

    #[tokio::test]
    async fn join_uses_the_recorded_roblox_id() {
        let mut groups = MockGroupApi::new();
        groups
            .expect_accept_join_request()
            .withf(|group, user, key| group == "32064664" && user == "111" && key == "group-secret")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let f = fixture(MockLicenseVerifier::new(), quiet_guild(), groups).await;
        f.service.ledger.insert("GEN-Lightsabers-AAAA-BBBB-CCCC-DDDD", pending("Lightsabers")).await.unwrap();

        let ctx = RequestContext::new("10", false, LogSettings::default());
        f.service.redeem(&ctx, "111", "GEN-Lightsabers-AAAA-BBBB-CCCC-DDDD").await.unwrap();
        let system = f.service.accept_join(&ctx, "lightsabers").await.unwrap();
        assert_eq!(system.name, "Lightsabers");
    }

    #[tokio::test]
    async fn join_requires_group_key_and_identity() {
        let mut groups = MockGroupApi::new();
        groups.expect_accept_join_request().times(0);
        let f = fixture(MockLicenseVerifier::new(), MockGuildApi::new(), groups).await;

        let ctx = RequestContext::new("10", false, LogSettings::default());
        assert!(matches!(
            f.service.accept_join(&ctx, "Blasters").await,
            Err(LicenseError::MissingGroupCredential(name)) if name == "Blasters"
        ));
        assert!(matches!(f.service.accept_join(&ctx, "Lightsabers").await, Err(LicenseError::NoIdentity)));
    }

    #[tokio::test]
    async fn join_failure_advises_retry() {
        let mut groups = MockGroupApi::new();
        groups
            .expect_accept_join_request()
            .returning(|_, _, _| Err(Error::Platform("400 Bad Request".into())));
        let f = fixture(MockLicenseVerifier::new(), quiet_guild(), groups).await;

        let admin = RequestContext::new("10", true, LogSettings::default());
        f.service.force_grant(&admin, "111", "Lightsabers").await.unwrap();
        // force grants do not record an identity on the admin's account
        assert!(matches!(f.service.accept_join(&admin, "Lightsabers").await, Err(LicenseError::NoIdentity)));

        f.service.accounts.set_roblox_id("10", "111").await.unwrap();
        assert!(matches!(
            f.service.accept_join(&admin, "Lightsabers").await,
            Err(LicenseError::JoinFailed(_))
        ));
    }
}
