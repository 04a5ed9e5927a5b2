// File: greenlit-core/src/services/discord/slashcommands/force_whitelist.rs

use twilight_model::application::command::CommandType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::{CommandOptions, system_option};
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

pub const NAME: &str = "force_whitelist";

pub fn create_force_whitelist_command(catalog: &SystemCatalog) -> CommandBuilder {
    CommandBuilder::new(NAME, "Whitelist a Roblox ID for a system without a license key.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(StringBuilder::new("roblox_id", "Roblox UserID to whitelist").required(true))
        .option(system_option(catalog, "System to grant", true))
}

pub async fn handle_force_whitelist(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let roblox_id = options.required_string("roblox_id")?;
    let system = options.required_string("system")?;

    let (redemption, _) = service.force_grant(ctx, roblox_id, system).await?;
    Ok(format!(
        "✅ **{}** has been manually whitelisted for **{}**.",
        redemption.roblox_id, redemption.system
    ))
}
