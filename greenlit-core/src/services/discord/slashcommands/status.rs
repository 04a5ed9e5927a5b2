// File: greenlit-core/src/services/discord/slashcommands/status.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::CommandBuilder;

use crate::services::{LicenseService, RequestContext};
use crate::utils::time::{days_remaining, discord_timestamp};
use greenlit_common::LicenseError;

pub const NAME: &str = "status";

pub fn create_status_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Show your Roblox ID and the systems you own.", CommandType::ChatInput)
}

pub async fn handle_status(service: &LicenseService, ctx: &RequestContext) -> Result<String, LicenseError> {
    let view = service.status(ctx).await?;
    let Some(account) = view.account else {
        return Ok("You have no whitelist records yet.".to_string());
    };
    if view.redemptions.is_empty() {
        return Ok("You haven’t redeemed any licenses yet.".to_string());
    }

    let mut lines = vec![
        "**Your Whitelist Status**".to_string(),
        format!("Roblox ID: `{}`", account.roblox_id.as_deref().unwrap_or("not set")),
        "Systems Owned:".to_string(),
    ];
    for r in &view.redemptions {
        lines.push(format!(
            "• **{}** – Redeemed: {} – Next update in {} day(s)",
            r.system,
            discord_timestamp(r.verified_at, 'D'),
            days_remaining(r.cooldown_ends_at, ctx.now)
        ));
    }
    Ok(lines.join("\n"))
}
