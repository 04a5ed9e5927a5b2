// File: greenlit-core/src/platforms/discord/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use twilight_gateway::{CloseFrame, Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};

use crate::Error;
use crate::platforms::discord::{DiscordGuildApi, parse_id};
use crate::services::LicenseService;
use crate::services::discord::slashcommands::{handle_interaction_create, register_guild_commands};

/// Gateway connection plus REST client for the one guild the bot serves.
pub struct DiscordBot {
    token: String,
    application_id: Id<ApplicationMarker>,
    guild_id: Id<GuildMarker>,
    http: Arc<HttpClient>,
}

impl DiscordBot {
    pub fn new(token: &str, application_id: &str, guild_id: &str) -> Result<Self, Error> {
        if token.is_empty() {
            return Err(Error::Config("Discord token is empty".into()));
        }
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.to_string())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        Ok(Self {
            token: token.to_string(),
            application_id: parse_id(application_id, "application")?,
            guild_id: parse_id(guild_id, "guild")?,
            http,
        })
    }

    pub fn guild_api(&self) -> DiscordGuildApi {
        DiscordGuildApi::new(self.http.clone(), self.guild_id)
    }

    /// Replaces the guild's slash commands with the current set.
    pub async fn register_commands(&self, service: &LicenseService) -> Result<(), Error> {
        register_guild_commands(&self.http, self.application_id, self.guild_id, service.catalog()).await?;
        info!("Registered slash commands for guild {}", self.guild_id);
        Ok(())
    }

    /// Runs the shard until `shutdown` flips to true. Each interaction is
    /// handled on its own task.
    pub async fn run(
        &self,
        service: Arc<LicenseService>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), Error> {
        let mut shard = Shard::new(ShardId::ONE, self.token.clone(), Intents::GUILDS);
        let sender = shard.sender();
        let flags = EventTypeFlags::READY | EventTypeFlags::INTERACTION_CREATE;
        info!("(DiscordBot) Shard started. Listening for interactions.");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("(DiscordBot) Shutdown requested; closing shard.");
                        let _ = sender.close(CloseFrame::NORMAL);
                        break;
                    }
                }
                item = shard.next_event(flags) => {
                    let Some(item) = item else {
                        warn!("(DiscordBot) Shard event stream ended.");
                        break;
                    };
                    match item {
                        Ok(Event::Ready(ready)) => {
                            info!("Shard => READY as {} (ID={})", ready.user.name, ready.user.id);
                        }
                        Ok(Event::InteractionCreate(interaction)) => {
                            let http = self.http.clone();
                            let application_id = self.application_id;
                            let service = service.clone();
                            tokio::spawn(async move {
                                if let Err(e) =
                                    handle_interaction_create(http, application_id, &service, &interaction).await
                                {
                                    error!("Error handling interaction: {e}");
                                }
                            });
                        }
                        Ok(other) => {
                            trace!("Shard => unhandled event: {:?}", other.kind());
                        }
                        Err(err) => {
                            error!("Shard => error receiving event: {err:?}");
                        }
                    }
                }
            }
        }

        debug!("(DiscordBot) Event loop ended.");
        Ok(())
    }
}
