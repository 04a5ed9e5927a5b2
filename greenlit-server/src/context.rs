//! greenlit-server/src/context.rs
//!
//! Wires configuration, storage, external clients and services together.

use std::sync::Arc;

use tracing::info;

use greenlit_common::models::SystemCatalog;
use greenlit_core::Database;
use greenlit_core::Error;
use greenlit_core::config::{BotConfig, ConfigOverrides};
use greenlit_core::platforms::{DiscordBot, PayhipVerifier, RobloxGroupClient};
use greenlit_core::repositories::{RedemptionRepository, SqliteRedemptionRepository};
use greenlit_core::services::LicenseService;
use greenlit_core::stores::DataStores;
use greenlit_core::web::AppState;

use crate::Args;

pub struct ServerContext {
    pub config: BotConfig,
    pub catalog: Arc<SystemCatalog>,
    pub stores: DataStores,
    pub redemptions: Arc<dyn RedemptionRepository>,
    pub web_state: AppState,
    /// Both are `None` in headless mode.
    pub discord: Option<DiscordBot>,
    pub service: Option<Arc<LicenseService>>,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let config = BotConfig::from_env(ConfigOverrides {
            data_dir: args.data_dir.clone(),
            db_path: args.db_path.clone(),
            http_addr: args.http_addr.clone(),
            systems_file: args.systems_file.clone(),
            headless: args.headless,
        })?;

        info!("Using SQLite database at {}", config.db_path);
        let db = Database::new(&config.db_path).await?;
        db.migrate().await?;

        let catalog = Arc::new(config.catalog.clone());
        for system in catalog.iter() {
            if system.group_api_key.is_none() {
                info!("No {} set; /join_sync is unavailable for '{}'", system.api_key_env_var(), system.name);
            }
        }

        let stores = DataStores::open(&config.data_dir);
        let redemptions: Arc<dyn RedemptionRepository> =
            Arc::new(SqliteRedemptionRepository::new(db.pool().clone()));
        let web_state = AppState::new(
            catalog.clone(),
            stores.ledger.clone(),
            stores.allow_lists.clone(),
            &config.payhip_api_key,
        );

        let (discord, service) = match &config.discord {
            Some(dc) => {
                let bot = DiscordBot::new(&dc.token, &dc.application_id, &dc.guild_id)?;
                let service = Arc::new(LicenseService::new(
                    catalog.clone(),
                    &db,
                    stores.clone(),
                    Arc::new(PayhipVerifier::new(config.payhip_api_key.clone())),
                    Arc::new(bot.guild_api()),
                    Arc::new(RobloxGroupClient::new()),
                ));
                (Some(bot), Some(service))
            }
            None => (None, None),
        };

        Ok(Self {
            config,
            catalog,
            stores,
            redemptions,
            web_state,
            discord,
            service,
        })
    }
}
