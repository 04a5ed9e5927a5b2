// File: greenlit-core/src/services/discord/slashcommands/mod.rs

pub mod force_whitelist;
pub mod generate_key;
pub mod history;
pub mod join_sync;
pub mod logs;
pub mod logsettings;
pub mod revoke;
pub mod rolesync;
pub mod status;
pub mod update_whitelist;
pub mod view_whitelist;
pub mod whitelist;

use std::sync::Arc;

use tracing::{debug, error, warn};
use twilight_http::Client as HttpClient;
use twilight_model::{
    application::interaction::{
        InteractionData,
        application_command::{CommandDataOption, CommandOptionValue},
    },
    channel::message::MessageFlags,
    gateway::payload::incoming::InteractionCreate,
    guild::Permissions,
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::Id,
    id::marker::{ApplicationMarker, GuildMarker},
};
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::Error;
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

/// Reply used whenever a command fails for an internal reason.
pub const GENERIC_ERROR_REPLY: &str = "❌ An error occurred while executing that command.";

/// Discord rejects message content longer than this many characters.
pub const MAX_REPLY_CHARS: usize = 2000;

/// Every command the bot registers, in registration order.
pub fn all_commands(catalog: &SystemCatalog) -> Vec<CommandBuilder> {
    vec![
        whitelist::create_whitelist_command(),
        status::create_status_command(),
        history::create_history_command(),
        update_whitelist::create_update_whitelist_command(catalog),
        rolesync::create_rolesync_command(),
        revoke::create_revoke_command(catalog),
        force_whitelist::create_force_whitelist_command(catalog),
        view_whitelist::create_view_whitelist_command(),
        logs::create_logs_command(),
        logsettings::create_logsettings_command(),
        join_sync::create_join_sync_command(catalog),
        generate_key::create_generate_key_command(catalog),
    ]
}

pub async fn register_guild_commands(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    guild_id: Id<GuildMarker>,
    catalog: &SystemCatalog,
) -> Result<(), Error> {
    let commands: Vec<_> = all_commands(catalog).into_iter().map(|c| c.build()).collect();

    http.interaction(application_id)
        .set_guild_commands(guild_id, &commands)
        .await
        .map_err(|e| Error::Platform(format!("Failed to register guild slash commands: {e}")))?;

    Ok(())
}

/// A `system` string option offering the catalog's names as choices.
pub(crate) fn system_option(catalog: &SystemCatalog, description: &str, required: bool) -> StringBuilder {
    StringBuilder::new("system", description)
        .required(required)
        .choices(
            catalog
                .iter()
                .take(25)
                .map(|s| (s.name.clone(), s.name.clone())),
        )
}

/// Dispatch slash commands from an `InteractionCreate`. Every command is
/// answered ephemerally: a deferred response first, then the final text.
pub async fn handle_interaction_create(
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    service: &LicenseService,
    event: &InteractionCreate,
) -> Result<(), Error> {
    let interaction = &event.0;

    let Some(InteractionData::ApplicationCommand(cmd_data)) = &interaction.data else {
        return Ok(());
    };
    let Some(actor) = interaction.author_id() else {
        warn!("Interaction {} has no author; ignoring", interaction.id);
        return Ok(());
    };

    http.interaction(application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::DeferredChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error deferring `/{}`: {e}", cmd_data.name)))?;

    let is_admin = interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.contains(Permissions::ADMINISTRATOR));

    let ctx = service.request_context(&actor.to_string(), is_admin).await;
    let options = CommandOptions::new(&cmd_data.options);
    debug!("/{} from {} (admin={})", cmd_data.name, ctx.actor_id, is_admin);

    let result = dispatch(service, &ctx, &cmd_data.name, &options).await;
    let content = render_reply(&cmd_data.name, result);

    let edit = http
        .interaction(application_id)
        .update_response(&interaction.token)
        .content(Some(content.as_str()))
        .await;
    if let Err(e) = edit {
        error!("Error responding to `/{}`: {}", cmd_data.name, e);
        http.interaction(application_id)
            .update_response(&interaction.token)
            .content(Some(GENERIC_ERROR_REPLY))
            .await
            .map_err(|e| Error::Platform(format!("Error responding to `/{}`: {e}", cmd_data.name)))?;
    }

    Ok(())
}

pub async fn dispatch(
    service: &LicenseService,
    ctx: &RequestContext,
    name: &str,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    match name {
        whitelist::NAME => whitelist::handle_whitelist(service, ctx, options).await,
        status::NAME => status::handle_status(service, ctx).await,
        history::NAME => history::handle_history(service, ctx).await,
        update_whitelist::NAME => update_whitelist::handle_update_whitelist(service, ctx, options).await,
        rolesync::NAME => rolesync::handle_rolesync(service, ctx).await,
        revoke::NAME => revoke::handle_revoke(service, ctx, options).await,
        force_whitelist::NAME => force_whitelist::handle_force_whitelist(service, ctx, options).await,
        view_whitelist::NAME => view_whitelist::handle_view_whitelist(service, ctx, options).await,
        logs::NAME => logs::handle_logs(service, ctx, options).await,
        logsettings::NAME => logsettings::handle_logsettings(service, ctx, options).await,
        join_sync::NAME => join_sync::handle_join_sync(service, ctx, options).await,
        generate_key::NAME => generate_key::handle_generate_key(service, ctx, options).await,
        other => Ok(format!("Unrecognized command: {other}")),
    }
}

/// Turns a handler result into the text sent back to Discord.
pub fn render_reply(command: &str, result: Result<String, LicenseError>) -> String {
    match result {
        Ok(text) => truncate_reply(text),
        Err(e) if e.is_internal() => {
            error!("Error executing /{}: {}", command, e);
            GENERIC_ERROR_REPLY.to_string()
        }
        Err(e) => format!("❌ {e}"),
    }
}

/// Joins `header` and `lines` one per line, dropping trailing lines that
/// would push the reply past `MAX_REPLY_CHARS` and noting how many were cut.
pub fn join_capped(header: &str, lines: &[String]) -> String {
    let mut out = header.to_string();
    let mut used = out.chars().count();
    for (i, line) in lines.iter().enumerate() {
        let left = lines.len() - i - 1;
        let reserve = if left > 0 { overflow_note(left).chars().count() + 1 } else { 0 };
        let cost = line.chars().count() + 1;
        if used + cost + reserve > MAX_REPLY_CHARS {
            out.push('\n');
            out.push_str(&overflow_note(lines.len() - i));
            return out;
        }
        out.push('\n');
        out.push_str(line);
        used += cost;
    }
    out
}

fn overflow_note(hidden: usize) -> String {
    format!("…and {hidden} more")
}

/// Last resort for replies that were not built with `join_capped`.
fn truncate_reply(text: String) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_REPLY_CHARS - 1).collect();
    cut.push('…');
    cut
}

/// Read access to an interaction's options by name.
#[derive(Debug, Clone, Copy)]
pub struct CommandOptions<'a> {
    options: &'a [CommandDataOption],
}

impl<'a> CommandOptions<'a> {
    pub fn new(options: &'a [CommandDataOption]) -> Self {
        Self { options }
    }

    fn value(&self, name: &str) -> Option<&'a CommandOptionValue> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    pub fn string(&self, name: &str) -> Option<&'a str> {
        match self.value(name) {
            Some(CommandOptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn required_string(&self, name: &str) -> Result<&'a str, LicenseError> {
        self.string(name)
            .ok_or_else(|| LicenseError::MissingOption(name.to_string()))
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.value(name) {
            Some(CommandOptionValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<String> {
        match self.value(name) {
            Some(CommandOptionValue::Channel(id)) => Some(id.to_string()),
            _ => None,
        }
    }

    /// The first subcommand and its own options.
    pub fn subcommand(&self) -> Option<(&'a str, CommandOptions<'a>)> {
        self.options.iter().find_map(|o| match &o.value {
            CommandOptionValue::SubCommand(inner) => Some((o.name.as_str(), CommandOptions::new(inner))),
            _ => None,
        })
    }
}

#[cfg(test)]
pub(crate) fn string_option(name: &str, value: &str) -> CommandDataOption {
    CommandDataOption {
        name: name.to_string(),
        value: CommandOptionValue::String(value.to_string()),
    }
}
