// tests/repository_tests.rs

use chrono::{Duration, Utc};

use greenlit_common::models::{AuditAction, NewRedemption};
use greenlit_core::repositories::{
    AccountRepository, AuditLogRepository, RedemptionRepository, SqliteAccountRepository,
    SqliteAuditLogRepository, SqliteRedemptionRepository,
};
use greenlit_core::utils::time::to_epoch_ms;
use greenlit_core::{Database, Error};

async fn setup_test_db() -> Database {
    let db = Database::new(":memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn new_redemption(discord_id: &str, system: &str, key: &str, roblox_id: &str) -> NewRedemption {
    let now = Utc::now();
    NewRedemption {
        discord_id: discord_id.to_string(),
        system: system.to_string(),
        license_key: key.to_string(),
        roblox_id: roblox_id.to_string(),
        verified_at: now,
        cooldown_ends_at: now + Duration::days(30),
    }
}

#[tokio::test]
async fn test_account_repository() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = SqliteAccountRepository::new(db.pool().clone());

    let joined = Utc::now();
    repo.ensure_account("10", joined).await?;
    // a second ensure must not reset joined_at
    repo.ensure_account("10", joined + Duration::days(3)).await?;
    repo.set_roblox_id("10", "111").await?;

    let account = repo.get_account("10").await?.expect("account should exist");
    assert_eq!(account.roblox_id.as_deref(), Some("111"));
    assert_eq!(to_epoch_ms(account.joined_at), to_epoch_ms(joined));
    assert!(repo.get_account("11").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_redemption_repository() -> Result<(), Error> {
    let db = setup_test_db().await;
    let accounts = SqliteAccountRepository::new(db.pool().clone());
    let repo = SqliteRedemptionRepository::new(db.pool().clone());
    accounts.ensure_account("10", Utc::now()).await?;

    let first = repo.insert_redemption(&new_redemption("10", "Blasters", "K-1", "111")).await?;
    repo.insert_redemption(&new_redemption("10", "Speeders", "K-2", "111")).await?;

    let dup = repo.insert_redemption(&new_redemption("10", "Blasters", "K-1", "222")).await;
    assert!(matches!(dup, Err(Error::Conflict(_))));

    assert_eq!(repo.get_by_key("K-1").await?.map(|r| r.id), Some(first.id));
    assert_eq!(repo.list_for_account("10").await?.len(), 2);
    assert_eq!(repo.list_for_system("Speeders").await?.len(), 1);
    assert_eq!(repo.find_by_roblox_id("111").await?.len(), 2);

    let until = Utc::now() + Duration::days(30);
    repo.update_identity(first.id, "333", until).await?;
    let updated = repo.get_by_key("K-1").await?.expect("row should exist");
    assert_eq!(updated.roblox_id, "333");
    assert_eq!(to_epoch_ms(updated.cooldown_ends_at), to_epoch_ms(until));
    assert!(matches!(
        repo.update_identity(9999, "1", until).await,
        Err(Error::NotFound(_))
    ));

    assert!(repo.delete_by_key("K-1").await?);
    assert!(!repo.delete_by_key("K-1").await?);
    assert!(repo.get_by_key("K-1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_audit_log_newest_first() -> Result<(), Error> {
    let db = setup_test_db().await;
    let repo = SqliteAuditLogRepository::new(db.pool().clone());

    let t0 = Utc::now();
    repo.append(AuditAction::Redeemed, Some("10"), Some("111"), Some("Blasters"), t0).await?;
    repo.append(AuditAction::Revoked, Some("1"), Some("10"), Some("Blasters"), t0 + Duration::seconds(5)).await?;
    repo.append(AuditAction::KeyGenerated, Some("1"), None, None, t0 + Duration::seconds(10)).await?;

    let recent = repo.recent(2).await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].action, AuditAction::KeyGenerated);
    assert_eq!(recent[1].action, AuditAction::Revoked);
    assert!(recent[0].system.is_none());
    Ok(())
}
