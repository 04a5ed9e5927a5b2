// File: greenlit-core/src/platforms/mod.rs

use async_trait::async_trait;
use crate::Error;

/// Remote confirmation that a purchase-issued key is genuine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// `Ok(false)` means the remote answered and rejected the key; any `Err`
    /// is a transport or remote failure.
    async fn verify(&self, product_key: &str, license_key: &str) -> Result<bool, Error>;
}

/// The slice of the Discord guild the bot acts on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuildApi: Send + Sync {
    async fn add_role(&self, user_id: &str, role_id: &str) -> Result<(), Error>;
    async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<(), Error>;
    async fn member_roles(&self, user_id: &str) -> Result<Vec<String>, Error>;
    async fn send_channel_message(&self, channel_id: &str, text: &str) -> Result<(), Error>;
}

/// Roblox group membership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupApi: Send + Sync {
    async fn accept_join_request(&self, group_id: &str, user_id: &str, api_key: &str) -> Result<(), Error>;
}

pub mod discord;
pub mod payhip;
pub mod roblox;

pub use discord::{DiscordBot, DiscordGuildApi};
pub use payhip::PayhipVerifier;
pub use roblox::RobloxGroupClient;
