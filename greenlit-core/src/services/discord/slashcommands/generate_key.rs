// File: greenlit-core/src/services/discord/slashcommands/generate_key.rs

use twilight_model::application::command::CommandType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::CommandBuilder;

use crate::services::discord::slashcommands::{CommandOptions, system_option};
use crate::services::{LicenseService, RequestContext};
use greenlit_common::LicenseError;
use greenlit_common::models::SystemCatalog;

pub const NAME: &str = "generate_key";

pub fn create_generate_key_command(catalog: &SystemCatalog) -> CommandBuilder {
    CommandBuilder::new(NAME, "Generate a redeemable license key for a system.", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .option(system_option(catalog, "System the key unlocks", true))
}

pub async fn handle_generate_key(
    service: &LicenseService,
    ctx: &RequestContext,
    options: &CommandOptions<'_>,
) -> Result<String, LicenseError> {
    ctx.require_admin()?;
    let system = options.required_string("system")?;
    let (key, system) = service.generate_key(ctx, system).await?;
    Ok(format!("🔑 Generated license key for **{}**: `{}`", system.name, key))
}
