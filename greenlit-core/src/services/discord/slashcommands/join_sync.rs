// File: greenlit-core/src/services/discord/slashcommands/join_sync.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::{CommandOptions, system_option};
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

pub const NAME: &str = "join_sync";

pub fn create_join_sync_command(catalog: &SystemCatalog) -> CommandBuilder {
    CommandBuilder::new(NAME, "Accept your pending join request to a system's Roblox group.", CommandType::ChatInput)
        .option(system_option(catalog, "The system whose group you requested to join", true))
}

pub async fn handle_join_sync(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    let system = options.required_string("system")?;
    let system = service.accept_join(ctx, system).await?;
    Ok(format!("✅ Your join request for **{}** has been accepted!", system.name))
}
