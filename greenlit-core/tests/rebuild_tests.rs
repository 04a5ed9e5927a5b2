// tests/rebuild_tests.rs

use chrono::Utc;

use greenlit_core::Error;
use greenlit_core::tasks::allow_list_rebuild::rebuild_allow_lists;
use greenlit_core::test_utils::helpers::TestHarness;

#[tokio::test]
async fn test_rebuild_matches_database() -> Result<(), Error> {
    let h = TestHarness::new().await?;
    let admin = h.admin("1", Utc::now());
    h.service.force_grant(&admin, "111", "Blasters").await.expect("force");
    h.service.force_grant(&admin, "222", "Blasters").await.expect("force");
    h.service.force_grant(&admin, "111", "Speeders").await.expect("force");

    // drift: a stray id and a lost one
    let blasters = h.catalog.find("Blasters").unwrap();
    h.stores.allow_lists.remove(blasters, "222").await?;
    h.stores.allow_lists.add(blasters, "999").await?;

    let total = rebuild_allow_lists(&h.catalog, h.service.redemptions().as_ref(), &h.stores.allow_lists).await?;
    assert_eq!(total, 3);
    assert_eq!(h.allow_list("Blasters").await?, vec!["111".to_string(), "222".to_string()]);
    assert_eq!(h.allow_list("Speeders").await?, vec!["111".to_string()]);
    // systems with no grants get an empty list
    assert!(h.stores.allow_lists.entries(h.catalog.find("Utilities").unwrap()).await?.is_some());
    Ok(())
}
