use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchaser, keyed by Discord user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub discord_id: String,
    /// Overwritten on every redemption and identity update.
    pub roblox_id: Option<String>,
    pub joined_at: DateTime<Utc>,
}
