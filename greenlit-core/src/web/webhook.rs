// File: greenlit-core/src/web/webhook.rs

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::web::AppState;
use greenlit_common::models::PendingGrant;

/// Payhip's webhook body. Every field is optional so that malformed events
/// fall through to the signature check instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayhipEvent {
    pub signature: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
    pub items: Vec<PayhipItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayhipItem {
    pub product_key: String,
    pub product_name: String,
}

/// Lowercase hex SHA-256 of `api_key`.
pub fn signature_for(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

pub async fn handle_payhip_webhook(
    State(state): State<AppState>,
    Json(event): Json<PayhipEvent>,
) -> (StatusCode, &'static str) {
    if event.signature.as_deref() != Some(state.expected_signature.as_str()) {
        warn!("Rejected webhook with invalid signature");
        return (StatusCode::BAD_REQUEST, "Invalid signature");
    }
    if event.kind.as_deref() != Some("paid") {
        info!("Ignoring Payhip event of type {:?}", event.kind);
        return (StatusCode::OK, "Ignored non-paid event");
    }

    let now = Utc::now();
    let mut grants = Vec::with_capacity(event.items.len());
    for item in event.items {
        let Some(system) = state.catalog.find(&item.product_name) else {
            warn!("Skipping purchase of unknown product '{}'", item.product_name);
            continue;
        };
        if item.product_key.is_empty() {
            warn!("Skipping '{}' item without a key", system.name);
            continue;
        }
        grants.push((
            item.product_key,
            PendingGrant {
                email: event.email.clone(),
                system: system.name.clone(),
                timestamp: now,
            },
        ));
    }

    if let Err(e) = state.ledger.insert_many(grants).await {
        error!("Failed to store pending licenses: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store licenses");
    }
    (StatusCode::OK, "OK")
}
