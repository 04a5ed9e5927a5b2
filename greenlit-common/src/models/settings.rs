use serde::{Deserialize, Serialize};

/// Audit mirroring settings, persisted as `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSettings {
    #[serde(default)]
    pub logs_enabled: bool,
    #[serde(default)]
    pub logs_channel_id: Option<String>,
}

impl LogSettings {
    /// The channel to mirror to, if mirroring is switched on and a channel is set.
    pub fn mirror_channel(&self) -> Option<&str> {
        if self.logs_enabled {
            self.logs_channel_id.as_deref()
        } else {
            None
        }
    }
}
