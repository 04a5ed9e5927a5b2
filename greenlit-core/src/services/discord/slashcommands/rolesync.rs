// File: greenlit-core/src/services/discord/slashcommands/rolesync.rs

use twilight_model::application::command::CommandType;
use twilight_util::builder::command::CommandBuilder;

use crate::services::{LicenseService, RequestContext, RoleSyncReport};
use greenlit_common::LicenseError;

pub const NAME: &str = "rolesync";

pub fn create_rolesync_command() -> CommandBuilder {
    CommandBuilder::new(NAME, "Fix your Discord roles to match the systems you own.", CommandType::ChatInput)
}

pub async fn handle_rolesync(service: &LicenseService, ctx: &RequestContext) -> Result<String, LicenseError> {
    let report = service.sync_roles(ctx).await?;
    Ok(format_report(&report))
}

fn bold_list(names: &[String]) -> String {
    names
        .iter()
        .map(|s| format!("**{s}**"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_report(report: &RoleSyncReport) -> String {
    if report.is_empty() {
        return "✅ Your roles are already up-to-date. No changes needed.".to_string();
    }
    let mut lines = Vec::new();
    if !report.added.is_empty() {
        lines.push(format!("✅ Added roles for: {}", bold_list(&report.added)));
    }
    if !report.removed.is_empty() {
        lines.push(format!("⚠️ Removed roles for: {}", bold_list(&report.removed)));
    }
    lines.join("\n")
}
