use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker stored as the purchaser contact of keys minted by `/generate_key`.
pub const GENERATED_LOCALLY: &str = "GENERATED_LOCALLY";

/// A key awaiting its first redemption. Stored in the pending-licenses map
/// under the key string itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGrant {
    pub email: Option<String>,
    pub system: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
