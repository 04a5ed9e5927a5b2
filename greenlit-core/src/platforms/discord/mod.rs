// File: greenlit-core/src/platforms/discord/mod.rs

pub mod guild_api;
pub mod runtime;

pub use guild_api::DiscordGuildApi;
pub use runtime::DiscordBot;

use twilight_model::id::Id;

use crate::Error;

/// Parses a snowflake string into a typed id.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<Id<T>, Error> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| Error::Parse(format!("Invalid {what} ID: {raw}")))
}
