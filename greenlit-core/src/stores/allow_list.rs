// File: greenlit-core/src/stores/allow_list.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Error;
use crate::stores::{read_json, write_json};
use greenlit_common::models::SystemDefinition;

/// Owner of the per-system allow-list files.
///
/// Every read-modify-write of one system's file happens while holding that
/// system's lock, so concurrent commands touching the same system are applied
/// one after the other. Files are JSON arrays of Roblox ids.
pub struct AllowListStore {
    dir: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AllowListStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: DashMap::new(),
        }
    }

    pub fn path_for(&self, system: &SystemDefinition) -> PathBuf {
        self.dir.join(&system.file)
    }

    fn lock_for(&self, system: &SystemDefinition) -> Arc<Mutex<()>> {
        self.locks
            .entry(system.name.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Current entries, or `None` when the file has never been written.
    pub async fn entries(&self, system: &SystemDefinition) -> Result<Option<Vec<String>>, Error> {
        let lock = self.lock_for(system);
        let _guard = lock.lock().await;
        read_json(&self.path_for(system)).await
    }

    /// Appends `id` unless present. Returns true when the file changed.
    pub async fn add(&self, system: &SystemDefinition, id: &str) -> Result<bool, Error> {
        self.modify(system, |ids| {
            if ids.iter().any(|existing| existing == id) {
                false
            } else {
                ids.push(id.to_string());
                true
            }
        })
        .await
    }

    /// Removes every occurrence of `id`. Returns true when the file changed.
    pub async fn remove(&self, system: &SystemDefinition, id: &str) -> Result<bool, Error> {
        self.modify(system, |ids| {
            let before = ids.len();
            ids.retain(|existing| existing != id);
            ids.len() != before
        })
        .await
    }

    /// Drops each of `old` and appends `new` (if absent), in one locked write.
    pub async fn replace(
        &self,
        system: &SystemDefinition,
        old: &[String],
        new: &str,
    ) -> Result<(), Error> {
        self.modify(system, |ids| {
            ids.retain(|existing| !old.contains(existing));
            if !ids.iter().any(|existing| existing == new) {
                ids.push(new.to_string());
            }
            true
        })
        .await?;
        Ok(())
    }

    /// Overwrites the file with exactly `ids`, deduplicated and sorted.
    pub async fn rebuild(&self, system: &SystemDefinition, ids: &[String]) -> Result<usize, Error> {
        let unique: BTreeSet<&String> = ids.iter().collect();
        let list: Vec<&String> = unique.into_iter().collect();
        let lock = self.lock_for(system);
        let _guard = lock.lock().await;
        write_json(&self.path_for(system), &list).await?;
        Ok(list.len())
    }

    async fn modify<F>(&self, system: &SystemDefinition, f: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        let lock = self.lock_for(system);
        let _guard = lock.lock().await;

        let path = self.path_for(system);
        let mut ids: Vec<String> = read_json(&path).await?.unwrap_or_default();
        let changed = f(&mut ids);
        if changed {
            write_json(&path, &ids).await?;
            debug!("Allow-list for '{}' now has {} entries", system.name, ids.len());
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlit_common::models::SystemCatalog;

    fn lightsabers() -> SystemDefinition {
        SystemCatalog::default().find("Lightsabers").cloned().unwrap()
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = AllowListStore::new(dir.path());
        let sys = lightsabers();

        assert!(store.entries(&sys).await.unwrap().is_none());
        assert!(store.add(&sys, "111").await.unwrap());
        assert!(!store.add(&sys, "111").await.unwrap());
        assert_eq!(store.entries(&sys).await.unwrap(), Some(vec!["111".to_string()]));
    }

    #[tokio::test]
    async fn replace_swaps_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = AllowListStore::new(dir.path());
        let sys = lightsabers();

        store.add(&sys, "111").await.unwrap();
        store.add(&sys, "333").await.unwrap();
        store.replace(&sys, &["111".to_string()], "222").await.unwrap();
        assert_eq!(
            store.entries(&sys).await.unwrap(),
            Some(vec!["333".to_string(), "222".to_string()])
        );
    }

    #[tokio::test]
    async fn concurrent_adds_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AllowListStore::new(dir.path()));
        let sys = lightsabers();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let sys = sys.clone();
            handles.push(tokio::spawn(async move {
                store.add(&sys, &i.to_string()).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.entries(&sys).await.unwrap().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn rebuild_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let store = AllowListStore::new(dir.path());
        let sys = lightsabers();

        store.add(&sys, "stale").await.unwrap();
        let n = store
            .rebuild(&sys, &["2".to_string(), "1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            store.entries(&sys).await.unwrap(),
            Some(vec!["1".to_string(), "2".to_string()])
        );
    }
}
