// File: greenlit-core/src/config.rs

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::Error;
use greenlit_common::models::{SystemCatalog, SystemDefinition};

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DATABASE_FILE: &str = "greenlit.db";

/// Values the binary takes from its command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: PathBuf,
    pub db_path: Option<String>,
    pub http_addr: Option<String>,
    pub systems_file: Option<PathBuf>,
    pub headless: bool,
}

/// Discord application credentials.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub application_id: String,
    pub guild_id: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub data_dir: PathBuf,
    pub db_path: String,
    pub http_addr: SocketAddr,
    pub payhip_api_key: String,
    /// `None` when running headless.
    pub discord: Option<DiscordConfig>,
    pub catalog: SystemCatalog,
}

impl BotConfig {
    /// Loads `.env` (if present) and builds the config from the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, Error> {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }
        Self::from_lookup(overrides, |k| std::env::var(k).ok())
    }

    /// Builds the config with `lookup` standing in for the environment.
    pub fn from_lookup<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("Missing required environment variable {key}")))
        };

        let discord = if overrides.headless {
            None
        } else {
            Some(DiscordConfig {
                token: require("DISCORD_TOKEN")?,
                application_id: require("DISCORD_CLIENT_ID")?,
                guild_id: require("DISCORD_GUILD_ID")?,
            })
        };
        let payhip_api_key = require("PAYHIP_API_KEY")?;

        let http_addr = match overrides.http_addr {
            Some(addr) => addr.parse()?,
            None => {
                let port = match lookup("PORT") {
                    Some(p) => p
                        .parse::<u16>()
                        .map_err(|_| Error::Config(format!("PORT is not a valid port: {p}")))?,
                    None => DEFAULT_HTTP_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let db_path = overrides.db_path.unwrap_or_else(|| {
            overrides.data_dir.join(DATABASE_FILE).to_string_lossy().into_owned()
        });

        let catalog = match &overrides.systems_file {
            Some(path) => load_systems_file(path)?,
            None => SystemCatalog::default(),
        };
        let catalog = catalog.with_group_keys(&lookup);

        Ok(Self {
            data_dir: overrides.data_dir,
            db_path,
            http_addr,
            payhip_api_key,
            discord,
            catalog,
        })
    }
}

/// Reads a JSON array of system definitions.
pub fn load_systems_file(path: &Path) -> Result<SystemCatalog, Error> {
    let raw = std::fs::read_to_string(path)?;
    let systems: Vec<SystemDefinition> = serde_json::from_str(&raw)?;
    if systems.is_empty() {
        return Err(Error::Config(format!("{} defines no systems", path.display())));
    }
    Ok(SystemCatalog::new(systems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn overrides() -> ConfigOverrides {
        ConfigOverrides {
            data_dir: PathBuf::from("data"),
            ..Default::default()
        }
    }

    #[test]
    fn full_environment() {
        let vars = env(&[
            ("DISCORD_TOKEN", "t"),
            ("DISCORD_CLIENT_ID", "1"),
            ("DISCORD_GUILD_ID", "2"),
            ("PAYHIP_API_KEY", "p"),
            ("PORT", "8080"),
            ("APIKEY_SHIP_SYSTEM", "ship-key"),
        ]);
        let cfg = BotConfig::from_lookup(overrides(), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.http_addr.port(), 8080);
        assert_eq!(cfg.db_path, PathBuf::from("data").join("greenlit.db").to_string_lossy());
        assert_eq!(cfg.discord.unwrap().guild_id, "2");
        assert_eq!(
            cfg.catalog.find("Ship System").unwrap().group_api_key.as_deref(),
            Some("ship-key")
        );
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let vars = env(&[("PAYHIP_API_KEY", "p")]);
        let err = BotConfig::from_lookup(overrides(), |k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("DISCORD_TOKEN")));
    }

    #[test]
    fn headless_needs_only_payhip() {
        let vars = env(&[("PAYHIP_API_KEY", "p")]);
        let mut o = overrides();
        o.headless = true;
        o.http_addr = Some("127.0.0.1:9000".into());
        let cfg = BotConfig::from_lookup(o, |k| vars.get(k).cloned()).unwrap();
        assert!(cfg.discord.is_none());
        assert_eq!(cfg.http_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.http_addr.port(), 9000);
    }

    #[test]
    fn systems_file_replaces_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("systems.json");
        std::fs::write(
            &path,
            r#"[{"name":"Hoverboards","file":"whitelist_hoverboards.json","role_id":"5","group_id":"6"}]"#,
        )
        .unwrap();
        let catalog = load_systems_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("hoverboards").unwrap().group_id, "6");
    }
}
