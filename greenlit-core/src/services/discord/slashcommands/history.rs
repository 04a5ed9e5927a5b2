// File: greenlit-core/src/services/discord/slashcommands/history.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::join_capped;
use crate::services::{LicenseService, RequestContext};
use crate::utils::time::discord_timestamp;
use greenlit_common::LicenseError;

pub const NAME: &str = "history";

pub fn create_history_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "List every license you have redeemed.", CommandType::ChatInput)
}

pub async fn handle_history(service: &LicenseService, ctx: &RequestContext) -> Result<String, LicenseError> {
    let rows = service.history(ctx).await?;
    if rows.is_empty() {
        return Ok("You have not redeemed any licenses yet.".to_string());
    }
    let lines: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "• **{}** – Key: `{}` – Redeemed: {}",
                r.system,
                r.license_key,
                discord_timestamp(r.verified_at, 'f')
            )
        })
        .collect();
    Ok(join_capped("**Your Purchase History:**", &lines))
}
