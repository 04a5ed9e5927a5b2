// src/tasks/allow_list_rebuild.rs

use tracing::info;

use crate::Error;
use crate::repositories::RedemptionRepository;
use crate::stores::AllowListStore;
use greenlit_common::models::SystemCatalog;

/// Writes each system's file as exactly the distinct Roblox ids of that
/// system's redemptions. Returns the total number of ids written.
pub async fn rebuild_allow_lists(
    catalog: &SystemCatalog,
    redemptions: &dyn RedemptionRepository,
    allow_lists: &AllowListStore,
) -> Result<usize, Error> {
    info!("Rebuilding allow-lists for {} systems...", catalog.len());
    let mut total = 0;
    for system in catalog.iter() {
        let ids: Vec<String> = redemptions
            .list_for_system(&system.name)
            .await?
            .into_iter()
            .map(|r| r.roblox_id)
            .collect();
        let written = allow_lists.rebuild(system, &ids).await?;
        info!("Allow-list for '{}' rebuilt with {} entries", system.name, written);
        total += written;
    }
    Ok(total)
}
