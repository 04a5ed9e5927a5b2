use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of action recorded in the audit trail. The string forms are what
/// is stored in the `logs.action_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Redeemed,
    Updated,
    Revoked,
    ForceGranted,
    JoinAccepted,
    KeyGenerated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Redeemed => "whitelist_redeemed",
            AuditAction::Updated => "whitelist_updated",
            AuditAction::Revoked => "revoke",
            AuditAction::ForceGranted => "force_whitelist",
            AuditAction::JoinAccepted => "join_accepted",
            AuditAction::KeyGenerated => "key_generated",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whitelist_redeemed" => Ok(AuditAction::Redeemed),
            "whitelist_updated" => Ok(AuditAction::Updated),
            "revoke" => Ok(AuditAction::Revoked),
            "force_whitelist" => Ok(AuditAction::ForceGranted),
            "join_accepted" => Ok(AuditAction::JoinAccepted),
            "key_generated" => Ok(AuditAction::KeyGenerated),
            other => Err(format!("Unknown audit action: {other}")),
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub id: i64,
    pub action: AuditAction,
    pub actor_id: Option<String>,
    pub target_id: Option<String>,
    pub system: Option<String>,
    pub timestamp: DateTime<Utc>,
}
