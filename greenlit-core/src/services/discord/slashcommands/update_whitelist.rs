// File: greenlit-core/src/services/discord/slashcommands/update_whitelist.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::{CommandOptions, system_option};
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

pub const NAME: &str = "update_whitelist";

pub fn create_update_whitelist_command(catalog: &SystemCatalog) -> CommandBuilder {
    CommandBuilder::new(NAME, "Change the Roblox ID whitelisted for one of your systems.", CommandType::ChatInput)
        .option(system_option(catalog, "The system to update", true))
        .option(StringBuilder::new("new_id", "Your new Roblox UserID").required(true))
}

pub async fn handle_update_whitelist(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    let system = options.required_string("system")?;
    let new_id = options.required_string("new_id")?;

    let (system, _) = service.update_identity(ctx, system, new_id).await?;
    Ok(format!(
        "✅ Your Roblox ID for **{}** has been updated to `{}`.\nYou cannot change it again for another 30 days.",
        system.name,
        new_id.trim()
    ))
}
