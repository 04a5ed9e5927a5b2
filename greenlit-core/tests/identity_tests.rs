// tests/identity_tests.rs

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};

use greenlit_common::LicenseError;
use greenlit_common::models::AuditAction;
use greenlit_core::Error;
use greenlit_core::services::discord::slashcommands::{CommandOptions, dispatch, render_reply};
use greenlit_core::test_utils::helpers::TestHarness;
use greenlit_core::utils::time::to_epoch_ms;
use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};

const GEN_KEY: &str = "GEN-Lightsabers-AAAA-BBBB-CCCC-DDDD";

fn opt(name: &str, value: &str) -> CommandDataOption {
    CommandDataOption {
        name: name.to_string(),
        value: CommandOptionValue::String(value.to_string()),
    }
}

async fn redeemed(h: &TestHarness, at: chrono::DateTime<Utc>) -> Result<(), Error> {
    h.issue_key(GEN_KEY, "Lightsabers").await?;
    h.service.redeem(&h.member("10", at), "111", GEN_KEY).await.expect("redeem");
    Ok(())
}

#[tokio::test]
async fn test_immediate_update_waits_thirty_days() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let t0 = Utc::now();
    redeemed(&h, t0).await?;

    let raw = vec![opt("system", "Lightsabers"), opt("new_id", "222")];
    let result = dispatch(&h.service, &h.member("10", t0), "update_whitelist", &CommandOptions::new(&raw)).await;
    assert_eq!(
        render_reply("update_whitelist", result),
        "❌ You must wait 30 more day(s) before changing your whitelist for **Lightsabers**."
    );
    assert_eq!(h.allow_list("Lightsabers").await?, vec!["111".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_update_after_cooldown_swaps_identity() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let t0 = Utc::now();
    redeemed(&h, t0).await?;
    let later = t0 + Duration::days(30);

    let raw = vec![opt("system", "lightsabers"), opt("new_id", " 222 ")];
    let reply = dispatch(&h.service, &h.member("10", later), "update_whitelist", &CommandOptions::new(&raw))
        .await
        .expect("update");
    assert!(reply.starts_with("✅ Your Roblox ID for **Lightsabers** has been updated to `222`."));

    assert_eq!(h.allow_list("Lightsabers").await?, vec!["222".to_string()]);
    let row = h.service.redemptions().get_by_key(GEN_KEY).await?.expect("row");
    assert_eq!(row.roblox_id, "222");
    assert_eq!(to_epoch_ms(row.cooldown_ends_at), to_epoch_ms(later + Duration::days(30)));

    let status = h.service.status(&h.member("10", later)).await.expect("status");
    assert_eq!(status.account.and_then(|a| a.roblox_id).as_deref(), Some("222"));

    let events = h.service.recent_logs(&h.admin("1", later), None).await.expect("logs");
    assert_eq!(events[0].action, AuditAction::Updated);

    // the fresh cooldown applies straight away
    let err = h
        .service
        .update_identity(&h.member("10", later + Duration::days(1)), "Lightsabers", "333")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::CooldownActive { days: 29, .. }));
    Ok(())
}

#[tokio::test]
async fn test_update_requires_known_and_owned_system() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let ctx = h.member("10", Utc::now());

    let err = h.service.update_identity(&ctx, "Hoverboards", "222").await.unwrap_err();
    assert_eq!(err.to_string(), "I don't recognize a system named **Hoverboards**.");

    let err = h.service.update_identity(&ctx, "Blasters", "222").await.unwrap_err();
    assert!(matches!(err, LicenseError::NoRedemption(s) if s == "Blasters"));
    Ok(())
}

#[tokio::test]
async fn test_status_and_history_views() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let t0 = Utc::now();
    let ctx = h.member("10", t0);

    let reply = dispatch(&h.service, &ctx, "status", &CommandOptions::new(&[])).await.expect("status");
    assert_eq!(reply, "You have no whitelist records yet.");
    let reply = dispatch(&h.service, &ctx, "history", &CommandOptions::new(&[])).await.expect("history");
    assert_eq!(reply, "You have not redeemed any licenses yet.");

    redeemed(&h, t0).await?;
    let ctx = h.member("10", t0 + Duration::days(10));
    let reply = dispatch(&h.service, &ctx, "status", &CommandOptions::new(&[])).await.expect("status");
    assert!(reply.contains("Roblox ID: `111`"));
    assert!(reply.contains(&format!("• **Lightsabers** – Redeemed: <t:{}:D>", t0.timestamp())));
    assert!(reply.contains("Next update in 20 day(s)"));

    let reply = dispatch(&h.service, &ctx, "history", &CommandOptions::new(&[])).await.expect("history");
    assert!(reply.contains(&format!("Key: `{GEN_KEY}`")));
    Ok(())
}

#[tokio::test]
async fn test_status_after_full_revoke() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    redeemed(&h, Utc::now()).await?;
    h.service.revoke(&h.admin("1", Utc::now()), "10", None).await.expect("revoke");

    let reply = dispatch(&h.service, &h.member("10", Utc::now()), "status", &CommandOptions::new(&[]))
        .await
        .expect("status");
    assert_eq!(reply, "You haven’t redeemed any licenses yet.");
    Ok(())
}

#[tokio::test]
async fn test_join_sync_accepts_recorded_identity() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    redeemed(&h, Utc::now()).await?;

    let raw = vec![opt("system", "Lightsabers")];
    let reply = dispatch(&h.service, &h.member("10", Utc::now()), "join_sync", &CommandOptions::new(&raw))
        .await
        .expect("join");
    assert_eq!(reply, "✅ Your join request for **Lightsabers** has been accepted!");
    assert_eq!(
        h.groups.accepted(),
        vec![("32064664".to_string(), "111".to_string(), "key-APIKEY_LIGHTSABERS".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_join_sync_failures() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let ctx = h.member("10", Utc::now());

    let err = h.service.accept_join(&ctx, "Lightsabers").await.unwrap_err();
    assert!(matches!(err, LicenseError::NoIdentity));

    redeemed(&h, Utc::now()).await?;
    h.groups.fail.store(true, Ordering::SeqCst);
    let err = h.service.accept_join(&ctx, "Lightsabers").await.unwrap_err();
    assert!(matches!(err, LicenseError::JoinFailed(_)));
    assert!(err.to_string().contains("try again"));
    Ok(())
}

#[tokio::test]
async fn test_join_sync_without_group_key() -> Result<(), Error> {
    let catalog = greenlit_common::models::SystemCatalog::default();
    let h = TestHarness::with_catalog(catalog).await?;
    redeemed(&h, Utc::now()).await?;

    let err = h
        .service
        .accept_join(&h.member("10", Utc::now()), "Lightsabers")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing API key for the **Lightsabers** group.");
    assert!(h.groups.accepted().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rolesync_reconciles() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    redeemed(&h, Utc::now()).await?;
    let ctx = h.member("10", Utc::now());

    let reply = dispatch(&h.service, &ctx, "rolesync", &CommandOptions::new(&[])).await.expect("sync");
    assert!(reply.contains("already up-to-date"));

    // lost the Lightsabers role, gained a Speeders role they never bought
    h.guild.roles.lock().unwrap().clear();
    h.guild.give_role("10", "1379224887071084620");

    let reply = dispatch(&h.service, &ctx, "rolesync", &CommandOptions::new(&[])).await.expect("sync");
    assert_eq!(reply, "✅ Added roles for: **Lightsabers**\n⚠️ Removed roles for: **Speeders**");
    assert_eq!(
        h.guild.roles_of("10").into_iter().collect::<Vec<_>>(),
        vec!["1379224887071084618".to_string()]
    );
    Ok(())
}
