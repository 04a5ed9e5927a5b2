// File: greenlit-core/src/platforms/roblox.rs

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::Error;
use crate::platforms::GroupApi;

pub const ROBLOX_GROUPS_BASE_URL: &str = "https://groups.roblox.com";

/// Accepts pending group join requests through the Roblox groups API.
#[derive(Clone)]
pub struct RobloxGroupClient {
    client: Client,
    base_url: String,
}

impl RobloxGroupClient {
    pub fn new() -> Self {
        Self::with_base_url(ROBLOX_GROUPS_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn accept_url(&self, group_id: &str, user_id: &str) -> String {
        format!(
            "{}/v2/groups/{}/join-requests/users/{}/accept",
            self.base_url.trim_end_matches('/'),
            group_id,
            user_id
        )
    }
}

impl Default for RobloxGroupClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupApi for RobloxGroupClient {
    async fn accept_join_request(&self, group_id: &str, user_id: &str, api_key: &str) -> Result<(), Error> {
        let url = self.accept_url(group_id, user_id);
        debug!("POST {}", url);
        self.client
            .post(&url)
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
