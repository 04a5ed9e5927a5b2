//! JSON file stores living next to the database: the per-system allow-lists,
//! the pending-licenses ledger and the log settings.

pub mod allow_list;
pub mod pending_ledger;
pub mod settings;

pub use allow_list::AllowListStore;
pub use pending_ledger::PendingLedger;
pub use settings::SettingsStore;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;

pub const PENDING_LEDGER_FILE: &str = "pending_licenses.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// The three file-backed stores, all rooted at one data directory.
#[derive(Clone)]
pub struct DataStores {
    pub allow_lists: Arc<AllowListStore>,
    pub ledger: Arc<PendingLedger>,
    pub settings: Arc<SettingsStore>,
}

impl DataStores {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            allow_lists: Arc::new(AllowListStore::new(data_dir)),
            ledger: Arc::new(PendingLedger::new(data_dir.join(PENDING_LEDGER_FILE))),
            settings: Arc::new(SettingsStore::new(data_dir.join(SETTINGS_FILE))),
        }
    }
}

/// Reads a JSON file; `Ok(None)` when it does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pretty-prints `value` to a sibling temp file and renames it over `path`.
pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let body = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
