// File: greenlit-core/src/test_utils/helpers.rs

//! Fakes for the external services plus a ready-wired `LicenseService` on an
//! in-memory database and a temporary data directory.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::Database;
use crate::Error;
use crate::platforms::{GroupApi, GuildApi, LicenseVerifier};
use crate::services::{LicenseService, RequestContext};
use crate::stores::DataStores;
use greenlit_common::models::{LogSettings, PendingGrant, SystemCatalog};

/// Verifier that answers from a fixed setting and counts calls.
#[derive(Default)]
pub struct StubVerifier {
    pub calls: AtomicUsize,
    pub reject: AtomicBool,
    pub unavailable: AtomicBool,
}

#[async_trait]
impl LicenseVerifier for StubVerifier {
    async fn verify(&self, _product_key: &str, _license_key: &str) -> Result<bool, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Platform("verifier unreachable".into()));
        }
        Ok(!self.reject.load(Ordering::SeqCst))
    }
}

/// Guild fake that tracks role membership and captured channel messages.
#[derive(Default)]
pub struct RecordingGuildApi {
    pub roles: Mutex<HashMap<String, BTreeSet<String>>>,
    pub messages: Mutex<Vec<(String, String)>>,
    pub fail_role_changes: AtomicBool,
}

impl RecordingGuildApi {
    pub fn roles_of(&self, user_id: &str) -> BTreeSet<String> {
        self.roles
            .lock()
            .map(|m| m.get(user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn give_role(&self, user_id: &str, role_id: &str) {
        if let Ok(mut m) = self.roles.lock() {
            m.entry(user_id.to_string()).or_default().insert(role_id.to_string());
        }
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn poisoned() -> Error {
        Error::Platform("fake guild lock poisoned".into())
    }
}

#[async_trait]
impl GuildApi for RecordingGuildApi {
    async fn add_role(&self, user_id: &str, role_id: &str) -> Result<(), Error> {
        if self.fail_role_changes.load(Ordering::SeqCst) {
            return Err(Error::Platform("Missing Permissions".into()));
        }
        self.roles
            .lock()
            .map_err(|_| Self::poisoned())?
            .entry(user_id.to_string())
            .or_default()
            .insert(role_id.to_string());
        Ok(())
    }

    async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<(), Error> {
        if self.fail_role_changes.load(Ordering::SeqCst) {
            return Err(Error::Platform("Missing Permissions".into()));
        }
        if let Some(set) = self.roles.lock().map_err(|_| Self::poisoned())?.get_mut(user_id) {
            set.remove(role_id);
        }
        Ok(())
    }

    async fn member_roles(&self, user_id: &str) -> Result<Vec<String>, Error> {
        Ok(self.roles_of(user_id).into_iter().collect())
    }

    async fn send_channel_message(&self, channel_id: &str, text: &str) -> Result<(), Error> {
        self.messages
            .lock()
            .map_err(|_| Self::poisoned())?
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Group fake recording every accept call as (group, user, api key).
#[derive(Default)]
pub struct RecordingGroupApi {
    pub accepted: Mutex<Vec<(String, String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingGroupApi {
    pub fn accepted(&self) -> Vec<(String, String, String)> {
        self.accepted.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GroupApi for RecordingGroupApi {
    async fn accept_join_request(&self, group_id: &str, user_id: &str, api_key: &str) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Platform("HTTP status client error (400 Bad Request)".into()));
        }
        self.accepted
            .lock()
            .map_err(|_| Error::Platform("fake group lock poisoned".into()))?
            .push((group_id.to_string(), user_id.to_string(), api_key.to_string()));
        Ok(())
    }
}

/// Everything a service-level test needs, sharing one temp data directory.
pub struct TestHarness {
    pub service: Arc<LicenseService>,
    pub db: Database,
    pub stores: DataStores,
    pub catalog: Arc<SystemCatalog>,
    pub verifier: Arc<StubVerifier>,
    pub guild: Arc<RecordingGuildApi>,
    pub groups: Arc<RecordingGroupApi>,
    pub dir: TempDir,
}

impl TestHarness {
    /// Default catalog; every system gets the group key `key-<NAME>`.
    pub async fn new() -> Result<Self, Error> {
        let catalog = SystemCatalog::default().with_group_keys(|var| Some(format!("key-{var}")));
        Self::with_catalog(catalog).await
    }

    pub async fn with_catalog(catalog: SystemCatalog) -> Result<Self, Error> {
        let db = Database::new(":memory:").await?;
        db.migrate().await?;
        let dir = tempfile::tempdir()?;
        let stores = DataStores::open(dir.path());
        let catalog = Arc::new(catalog);
        let verifier = Arc::new(StubVerifier::default());
        let guild = Arc::new(RecordingGuildApi::default());
        let groups = Arc::new(RecordingGroupApi::default());

        let service = Arc::new(LicenseService::new(
            catalog.clone(),
            &db,
            stores.clone(),
            verifier.clone(),
            guild.clone(),
            groups.clone(),
        ));

        Ok(Self { service, db, stores, catalog, verifier, guild, groups, dir })
    }

    pub fn member(&self, discord_id: &str, now: DateTime<Utc>) -> RequestContext {
        RequestContext::at(discord_id, false, LogSettings::default(), now)
    }

    pub fn admin(&self, discord_id: &str, now: DateTime<Utc>) -> RequestContext {
        RequestContext::at(discord_id, true, LogSettings::default(), now)
    }

    /// Places `key` in the ledger for `system`.
    pub async fn issue_key(&self, key: &str, system: &str) -> Result<(), Error> {
        self.stores
            .ledger
            .insert(
                key,
                PendingGrant {
                    email: Some("buyer@example.com".into()),
                    system: system.to_string(),
                    timestamp: Utc::now(),
                },
            )
            .await
    }

    /// The allow-list for `system`, empty when the file does not exist.
    pub async fn allow_list(&self, system: &str) -> Result<Vec<String>, Error> {
        let def = self
            .catalog
            .find(system)
            .ok_or_else(|| Error::NotFound(format!("system {system}")))?;
        Ok(self.stores.allow_lists.entries(def).await?.unwrap_or_default())
    }
}
