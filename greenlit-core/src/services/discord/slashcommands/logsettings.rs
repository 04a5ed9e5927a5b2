// File: greenlit-core/src/services/discord/slashcommands/logsettings.rs

use twilight_model::application::command::CommandType;
use twilight_model::channel::ChannelType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{ChannelBuilder, CommandBuilder, SubCommandBuilder};

use crate::services::discord::slashcommands::CommandOptions;
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::LogSettings;

pub const NAME: &str = "logsettings";

pub fn create_logsettings_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Configure where audit events are mirrored.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(
            SubCommandBuilder::new("channel", "Set the channel audit events are posted to").option(
                ChannelBuilder::new("channel", "Text channel for audit events")
                    .required(true)
                    .channel_types([ChannelType::GuildText]),
            ),
        )
        .option(SubCommandBuilder::new("enable", "Start mirroring audit events"))
        .option(SubCommandBuilder::new("disable", "Stop mirroring audit events"))
        .option(SubCommandBuilder::new("show", "Show the current settings"))
}

pub async fn handle_logsettings(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let (sub, sub_options) = options
        .subcommand()
        .ok_or_else(|| LicenseError::MissingOption("subcommand".to_string()))?;

    match sub {
        "channel" => {
            let channel = sub_options
                .channel("channel")
                .ok_or_else(|| LicenseError::MissingOption("channel".to_string()))?;
            service.set_log_channel(ctx, &channel).await?;
            Ok(format!("✅ Log channel set to <#{channel}>."))
        }
        "enable" => {
            let settings = service.set_logs_enabled(ctx, true).await?;
            if settings.logs_channel_id.is_none() {
                Ok("✅ Logging enabled. Set a channel with `/logsettings channel` to start receiving events.".to_string())
            } else {
                Ok("✅ Logging enabled.".to_string())
            }
        }
        "disable" => {
            service.set_logs_enabled(ctx, false).await?;
            Ok("✅ Logging disabled.".to_string())
        }
        "show" => Ok(describe(&service.log_settings(ctx)?)),
        other => Err(LicenseError::MissingOption(format!("subcommand ({other} is not one)"))),
    }
}

fn describe(settings: &LogSettings) -> String {
    let channel = settings
        .logs_channel_id
        .as_deref()
        .map(|id| format!("<#{id}>"))
        .unwrap_or_else(|| "not set".to_string());
    format!(
        "**Log Settings**\nEnabled: {}\nChannel: {}",
        if settings.logs_enabled { "yes" } else { "no" },
        channel
    )
}
