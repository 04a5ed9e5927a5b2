use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful grant of a system to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: i64,
    pub discord_id: String,
    pub system: String,
    pub license_key: String,
    /// The identity this grant placed on the system's allow-list.
    pub roblox_id: String,
    pub verified_at: DateTime<Utc>,
    pub cooldown_ends_at: DateTime<Utc>,
}

impl Redemption {
    pub fn cooldown_active(&self, now: DateTime<Utc>) -> bool {
        now < self.cooldown_ends_at
    }
}

/// Insert payload; the row id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRedemption {
    pub discord_id: String,
    pub system: String,
    pub license_key: String,
    pub roblox_id: String,
    pub verified_at: DateTime<Utc>,
    pub cooldown_ends_at: DateTime<Utc>,
}
