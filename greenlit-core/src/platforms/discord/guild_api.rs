// File: greenlit-core/src/platforms/discord/guild_api.rs

use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

use crate::Error;
use crate::platforms::GuildApi;
use crate::platforms::discord::parse_id;

/// `GuildApi` over the Discord REST API, bound to one guild.
#[derive(Clone)]
pub struct DiscordGuildApi {
    http: Arc<HttpClient>,
    guild_id: Id<GuildMarker>,
}

impl DiscordGuildApi {
    pub fn new(http: Arc<HttpClient>, guild_id: Id<GuildMarker>) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl GuildApi for DiscordGuildApi {
    async fn add_role(&self, user_id: &str, role_id: &str) -> Result<(), Error> {
        let user = parse_id::<UserMarker>(user_id, "user")?;
        let role = parse_id::<RoleMarker>(role_id, "role")?;
        self.http
            .add_guild_member_role(self.guild_id, user, role)
            .await
            .map_err(|e| Error::Platform(format!("Failed to add role {role_id} to {user_id}: {e}")))?;
        Ok(())
    }

    async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<(), Error> {
        let user = parse_id::<UserMarker>(user_id, "user")?;
        let role = parse_id::<RoleMarker>(role_id, "role")?;
        self.http
            .remove_guild_member_role(self.guild_id, user, role)
            .await
            .map_err(|e| Error::Platform(format!("Failed to remove role {role_id} from {user_id}: {e}")))?;
        Ok(())
    }

    async fn member_roles(&self, user_id: &str) -> Result<Vec<String>, Error> {
        let user = parse_id::<UserMarker>(user_id, "user")?;
        let member = self
            .http
            .guild_member(self.guild_id, user)
            .await
            .map_err(|e| Error::Platform(format!("Error fetching member {user_id}: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing member {user_id}: {e}")))?;
        Ok(member.roles.iter().map(|r| r.to_string()).collect())
    }

    async fn send_channel_message(&self, channel_id: &str, text: &str) -> Result<(), Error> {
        let channel = parse_id::<ChannelMarker>(channel_id, "channel")?;
        self.http
            .create_message(channel)
            .content(text)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?;
        Ok(())
    }
}
