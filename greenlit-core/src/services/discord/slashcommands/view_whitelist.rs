// File: greenlit-core/src/services/discord/slashcommands/view_whitelist.rs

use twilight_model::application::command::CommandType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::services::discord::slashcommands::{CommandOptions, join_capped};
use crate::services::{LicenseService, RequestContext};
use crate::utils::time::discord_timestamp;
use greenlit_common::LicenseError;

pub const NAME: &str = "view_whitelist";

pub fn create_view_whitelist_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Show a user's whitelist entries.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(StringBuilder::new("target", "License key, Discord user ID or Roblox user ID").required(true))
}

pub async fn handle_view_whitelist(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let target = options.required_string("target")?;
    let rows = service.view_entries(ctx, target).await?;

    let mut lines = Vec::with_capacity(rows.len());
    for r in &rows {
        lines.push(format!(
            "• **{}** – Roblox ID: `{}` – Redeemed: {} – Cooldown ends: {}",
            r.system,
            r.roblox_id,
            discord_timestamp(r.verified_at, 'f'),
            discord_timestamp(r.cooldown_ends_at, 'D')
        ));
    }
    Ok(join_capped("**Whitelist Entries for That User:**", &lines))
}
