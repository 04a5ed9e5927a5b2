// File: greenlit-core/src/services/discord/slashcommands/whitelist.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::CommandOptions;
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;

pub const NAME: &str = "whitelist";

pub fn create_whitelist_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Redeem a license key to be whitelisted for a system.", CommandType::ChatInput)
        .option(StringBuilder::new("roblox_id", "Your Roblox UserID (e.g. 12345678)").required(true))
        .option(StringBuilder::new("license_key", "Your license key (Payhip or GEN- prefixed)").required(true))
}

pub async fn handle_whitelist(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    let roblox_id = options.required_string("roblox_id")?;
    let license_key = options.required_string("license_key")?;

    let (redemption, system) = service.redeem(ctx, roblox_id, license_key).await?;
    Ok(format!(
        "✅ You are now whitelisted for **{name}**!\n\
         ➡️ Join the **{name}** Roblox group: {url}\n\
         ➡️ After you click “Join Group” in Roblox, run `/join_sync {name}`.",
        name = redemption.system,
        url = system.group_url(),
    ))
}
