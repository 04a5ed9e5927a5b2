// File: greenlit-core/src/platforms/payhip.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::platforms::LicenseVerifier;

pub const PAYHIP_VERIFY_URL: &str = "https://payhip.com/api/v1/license/verify";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: bool,
}

/// Payhip's license verification endpoint.
#[derive(Clone)]
pub struct PayhipVerifier {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PayhipVerifier {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, PAYHIP_VERIFY_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LicenseVerifier for PayhipVerifier {
    async fn verify(&self, product_key: &str, license_key: &str) -> Result<bool, Error> {
        debug!("Verifying license for product '{}' with Payhip", product_key);
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("product_key", product_key), ("license_key", license_key)])
            .header("Authorization", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let body: VerifyResponse = resp.json().await?;
        Ok(body.valid)
    }
}
