// File: greenlit-core/src/services/discord/slashcommands/logs.rs

use twilight_model::application::command::CommandType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder};

use crate::services::discord::slashcommands::{CommandOptions, join_capped};
use crate::services::{LicenseService, RequestContext};
use crate::utils::time::discord_timestamp;
use greenlit_common::LicenseError;
use greenlit_common::models::AuditEvent;

pub const NAME: &str = "logs";

pub fn create_logs_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Show the most recent audit log entries.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(
            IntegerBuilder::new("limit", "How many entries to show (default 10)")
                .min_value(1)
                .max_value(50),
        )
}

pub async fn handle_logs(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let events = service.recent_logs(ctx, options.integer("limit")).await?;
    if events.is_empty() {
        return Ok("No logs to display.".to_string());
    }
    let lines: Vec<String> = events.iter().map(format_event).collect();
    Ok(join_capped("**Recent Actions:**", &lines))
}

fn format_event(e: &AuditEvent) -> String {
    format!(
        "• [{}] **{}** – actor: `{}` – target: `{}` – system: `{}`",
        discord_timestamp(e.timestamp, 'f'),
        e.action,
        e.actor_id.as_deref().unwrap_or("-"),
        e.target_id.as_deref().unwrap_or("-"),
        e.system.as_deref().unwrap_or("-"),
    )
}
