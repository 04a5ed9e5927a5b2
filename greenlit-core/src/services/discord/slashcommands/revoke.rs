// File: greenlit-core/src/services/discord/slashcommands/revoke.rs

use twilight_model::application::command::CommandType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::{CommandOptions, system_option};
use crate::services::{LicenseService, RequestContext, RevokeOutcome, RevokeTarget};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

pub const NAME: &str = "revoke";

pub fn create_revoke_command(catalog: &SystemCatalog) -> CommandBuilder {
    CommandBuilder::new(NAME, "Revoke a whitelist by license key, Discord ID or Roblox ID.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(StringBuilder::new("target", "License key, Discord user ID or Roblox user ID").required(true))
        .option(system_option(catalog, "Only revoke this system", false))
}

pub async fn handle_revoke(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let target = options.required_string("target")?;
    let outcome = service.revoke(ctx, target, options.string("system")).await?;
    Ok(format_outcome(&outcome))
}

pub fn format_outcome(outcome: &RevokeOutcome) -> String {
    match &outcome.target {
        RevokeTarget::License { license_key, system } => {
            format!("✅ Revoked whitelist for **{system}** (license: `{license_key}`).")
        }
        RevokeTarget::Accounts { discord_ids } => {
            let users = discord_ids
                .iter()
                .map(|id| format!("<@{id}>"))
                .collect::<Vec<_>>()
                .join(", ");
            match &outcome.system_filter {
                Some(system) => format!("✅ Revoked **{system}** from user {users}."),
                None => format!("✅ Revoked **all** whitelist entries from user {users}."),
            }
        }
    }
}
