// File: greenlit-core/src/services/context.rs

use chrono::{DateTime, Utc};

use greenlit_common::LicenseError;
use greenlit_common::models::LogSettings;

/// Per-invocation state threaded through every service call: who is acting,
/// whether they may use admin commands, the settings as loaded when the
/// request began, and a single clock reading so every timestamp written by
/// one request agrees.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor_id: String,
    pub is_admin: bool,
    pub settings: LogSettings,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(actor_id: impl Into<String>, is_admin: bool, settings: LogSettings) -> Self {
        Self::at(actor_id, is_admin, settings, Utc::now())
    }

    pub fn at(
        actor_id: impl Into<String>,
        is_admin: bool,
        settings: LogSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            is_admin,
            settings,
            now,
        }
    }

    pub fn require_admin(&self) -> Result<(), LicenseError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(LicenseError::AdminOnly)
        }
    }
}
