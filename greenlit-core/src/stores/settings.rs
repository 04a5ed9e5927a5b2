// File: greenlit-core/src/stores/settings.rs

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::error;

use crate::Error;
use crate::stores::{read_json, write_json};
use greenlit_common::models::LogSettings;

/// Persisted audit-mirroring settings. Nothing is cached: `load` always reads
/// the file, and each mutation is a load-modify-save under one lock.
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Missing or unreadable files yield the defaults (mirroring off).
    pub async fn load(&self) -> LogSettings {
        match read_json::<LogSettings>(&self.path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => LogSettings::default(),
            Err(e) => {
                error!("Error reading {}: {}", self.path.display(), e);
                LogSettings::default()
            }
        }
    }

    pub async fn set_channel(&self, channel_id: &str) -> Result<LogSettings, Error> {
        let channel_id = channel_id.to_string();
        self.update(move |s| s.logs_channel_id = Some(channel_id)).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<LogSettings, Error> {
        self.update(move |s| s.logs_enabled = enabled).await
    }

    async fn update<F>(&self, f: F) -> Result<LogSettings, Error>
    where
        F: FnOnce(&mut LogSettings),
    {
        let _guard = self.lock.lock().await;
        let mut settings = self.load().await;
        f(&mut settings);
        write_json(&self.path, &settings).await?;
        Ok(settings)
    }
}
