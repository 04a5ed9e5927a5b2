// File: greenlit-core/src/stores/pending_ledger.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::info;

use crate::Error;
use crate::stores::{read_json, write_json};
use greenlit_common::models::PendingGrant;

/// The pending-licenses map: key string → grant awaiting redemption.
pub struct PendingLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PendingLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, PendingGrant>, Error> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    pub async fn get(&self, key: &str) -> Result<Option<PendingGrant>, Error> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    pub async fn contains(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key).await?.is_some())
    }

    pub async fn insert(&self, key: &str, grant: PendingGrant) -> Result<(), Error> {
        self.insert_many(vec![(key.to_string(), grant)]).await
    }

    /// Adds or overwrites several entries in one write.
    pub async fn insert_many(&self, grants: Vec<(String, PendingGrant)>) -> Result<(), Error> {
        if grants.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let count = grants.len();
        for (key, grant) in grants {
            map.insert(key, grant);
        }
        write_json(&self.path, &map).await?;
        info!("Stored {} pending license(s); ledger now holds {}", count, map.len());
        Ok(())
    }

    /// Deletes `key`, returning its grant if it was present.
    pub async fn remove(&self, key: &str) -> Result<Option<PendingGrant>, Error> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let removed = map.remove(key);
        if removed.is_some() {
            write_json(&self.path, &map).await?;
        }
        Ok(removed)
    }

    pub async fn len(&self) -> Result<usize, Error> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.len())
    }
}
