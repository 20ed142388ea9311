//! In-memory fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use ferry::adapters::traits::{DestinationApi, RemoteFolder, SourceApi};
use ferry::config::{CheckpointPolicy, CredentialMode};
use ferry::core::credentials::{AccessToken, CredentialManager, TokenEndpoint, TokenGrant};
use ferry::core::state::storage::TransferredSet;
use ferry::core::state::{StateManager, StateStorage};
use ferry::core::transfer::{EngineOptions, PacingPolicy, TransferEngine};
use ferry::domain::{
    AuthError, ContainerId, DestinationError, FerryError, Record, Result, SourceError,
    SourceFileId,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const PARENT: &str = "parent-folder";

/// Record with a single grouping field
pub fn record(id: &str, key: &str) -> Record {
    Record::new(id, vec![key.to_string()], "photo")
}

pub fn parent() -> ContainerId {
    ContainerId::new(PARENT).unwrap()
}

/// Token endpoint that hands out `token-1`, `token-2`, ...
#[derive(Default)]
pub struct FakeTokenEndpoint {
    pub issued: AtomicU64,
    pub fail: AtomicBool,
}

impl FakeTokenEndpoint {
    pub fn calls(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for FakeTokenEndpoint {
    async fn request_token(&self) -> std::result::Result<TokenGrant, AuthError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::RefreshFailed("authority unavailable".to_string()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant::new(format!("token-{n}"), Some(3600)))
    }
}

/// Source that serves `content-{id}` for every id
///
/// Tokens with a generation below `min_generation` are answered with 401.
#[derive(Default)]
pub struct FakeSource {
    pub min_generation: AtomicU64,
    pub failing: Mutex<HashSet<String>>,
    pub fetches: Mutex<Vec<(String, u64)>>,
}

impl FakeSource {
    pub fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn heal(&self, id: &str) {
        self.failing.lock().unwrap().remove(id);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl SourceApi for FakeSource {
    async fn fetch_file(
        &self,
        id: &SourceFileId,
        token: &AccessToken,
    ) -> std::result::Result<Vec<u8>, SourceError> {
        self.fetches
            .lock()
            .unwrap()
            .push((id.to_string(), token.generation));

        if token.generation < self.min_generation.load(Ordering::SeqCst) {
            return Err(SourceError::Unauthorized);
        }
        if self.failing.lock().unwrap().contains(id.as_str()) {
            return Err(SourceError::Http {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(format!("content-{id}").into_bytes())
    }
}

/// An uploaded file as seen by [`FakeDestination`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub parent: String,
    pub content: Vec<u8>,
}

/// Destination holding folders and files in memory
#[derive(Default)]
pub struct FakeDestination {
    /// (folder, parent id)
    pub folders: Mutex<Vec<(RemoteFolder, String)>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub lookups: AtomicUsize,
    pub creates: AtomicUsize,
    pub fail_uploads: Mutex<HashSet<String>>,
    pub fail_listing: AtomicBool,
}

impl FakeDestination {
    pub fn with_folder(self, id: &str, name: &str) -> Self {
        self.folders.lock().unwrap().push((
            RemoteFolder {
                id: ContainerId::new(id).unwrap(),
                name: name.to_string(),
            },
            PARENT.to_string(),
        ));
        self
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.folders
            .lock()
            .unwrap()
            .iter()
            .map(|(f, _)| f.name.clone())
            .collect()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn remote_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
            + self.creates.load(Ordering::SeqCst)
            + self.upload_count()
    }
}

#[async_trait]
impl DestinationApi for FakeDestination {
    async fn list_folders(
        &self,
        name: Option<&str>,
        parent: Option<&ContainerId>,
    ) -> std::result::Result<Vec<RemoteFolder>, DestinationError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(DestinationError::Connection("connection reset".to_string()));
        }
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .folders
            .lock()
            .unwrap()
            .iter()
            .filter(|(f, p)| {
                name.map_or(true, |n| f.name == n) && parent.map_or(true, |id| p == id.as_str())
            })
            .map(|(f, _)| f.clone())
            .collect())
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: &ContainerId,
    ) -> std::result::Result<ContainerId, DestinationError> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        let id = ContainerId::new(format!("folder-{n}")).unwrap();
        self.folders.lock().unwrap().push((
            RemoteFolder {
                id: id.clone(),
                name: name.to_string(),
            },
            parent.to_string(),
        ));
        Ok(id)
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &ContainerId,
        content: Vec<u8>,
        _mime_type: &str,
    ) -> std::result::Result<String, DestinationError> {
        if self.fail_uploads.lock().unwrap().contains(name) {
            return Err(DestinationError::Http {
                status: 503,
                message: "backend error".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(Upload {
            name: name.to_string(),
            parent: parent.to_string(),
            content,
        });
        Ok(format!("file-{}", uploads.len()))
    }
}

/// State storage in memory, with write failure injection
#[derive(Default)]
pub struct MemoryStateStorage {
    pub checkpoint: Mutex<Option<usize>>,
    pub ledger: Mutex<TransferredSet>,
    pub checkpoint_writes: Mutex<Vec<usize>>,
    pub fail_ledger_writes: AtomicBool,
    pub fail_checkpoint_writes: AtomicBool,
}

impl MemoryStateStorage {
    pub fn with_checkpoint(self, cursor: usize) -> Self {
        *self.checkpoint.lock().unwrap() = Some(cursor);
        self
    }

    pub fn with_transferred(self, ids: &[&str]) -> Self {
        self.ledger
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| SourceFileId::new(*id).unwrap()));
        self
    }

    pub fn checkpoint(&self) -> Option<usize> {
        *self.checkpoint.lock().unwrap()
    }

    pub fn ledger_ids(&self) -> Vec<String> {
        self.ledger
            .lock()
            .unwrap()
            .iter()
            .map(|id| id.to_string())
            .collect()
    }
}

#[async_trait]
impl StateStorage for MemoryStateStorage {
    async fn load_checkpoint(&self) -> Result<Option<usize>> {
        Ok(*self.checkpoint.lock().unwrap())
    }

    async fn save_checkpoint(&self, cursor: usize) -> Result<()> {
        if self.fail_checkpoint_writes.load(Ordering::SeqCst) {
            return Err(FerryError::Persistence("disk full".to_string()));
        }
        self.checkpoint_writes.lock().unwrap().push(cursor);
        *self.checkpoint.lock().unwrap() = Some(cursor);
        Ok(())
    }

    async fn clear_checkpoint(&self) -> Result<()> {
        *self.checkpoint.lock().unwrap() = None;
        Ok(())
    }

    async fn load_ledger(&self) -> Result<TransferredSet> {
        Ok(self.ledger.lock().unwrap().clone())
    }

    async fn save_ledger(&self, ledger: &TransferredSet) -> Result<()> {
        if self.fail_ledger_writes.load(Ordering::SeqCst) {
            return Err(FerryError::Persistence("disk full".to_string()));
        }
        *self.ledger.lock().unwrap() = ledger.clone();
        Ok(())
    }
}

/// Everything one engine run needs, with handles kept for assertions
pub struct Harness {
    pub source: Arc<FakeSource>,
    pub destination: Arc<FakeDestination>,
    pub storage: Arc<MemoryStateStorage>,
    pub endpoint: Arc<FakeTokenEndpoint>,
    pub credentials: Arc<CredentialManager>,
    pub pacing: PacingPolicy,
    pub credential_mode: CredentialMode,
    pub checkpoint_policy: CheckpointPolicy,
    pub shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Harness {
    pub fn new(destination: FakeDestination, storage: MemoryStateStorage) -> Self {
        let endpoint = Arc::new(FakeTokenEndpoint::default());
        let credentials = Arc::new(CredentialManager::new("zoho", endpoint.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            source: Arc::new(FakeSource::default()),
            destination: Arc::new(destination),
            storage: Arc::new(storage),
            endpoint,
            credentials,
            pacing: PacingPolicy::immediate(50),
            credential_mode: CredentialMode::Background,
            checkpoint_policy: CheckpointPolicy::EveryRecord,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn empty() -> Self {
        Self::new(FakeDestination::default(), MemoryStateStorage::default())
    }

    /// Load state, obtain a token, prime the cache
    pub async fn engine(&self) -> TransferEngine {
        let state = StateManager::load(self.storage.clone()).await.unwrap();
        if self.credentials.current_token().is_err() {
            self.credentials.refresh().await.unwrap();
        }

        let mut engine = TransferEngine::new(
            self.source.clone(),
            self.destination.clone(),
            self.credentials.clone(),
            state,
            EngineOptions {
                parent: parent(),
                pacing: self.pacing.clone(),
                credential_mode: self.credential_mode,
                checkpoint_policy: self.checkpoint_policy,
            },
            self.shutdown_rx.clone(),
        );
        engine.prime_cache().await;
        engine
    }

    /// Upload names in order
    pub fn uploaded_names(&self) -> Vec<String> {
        self.destination
            .uploads()
            .into_iter()
            .map(|u| u.name)
            .collect()
    }

    pub fn record_map(records: &[Record]) -> HashMap<String, String> {
        records
            .iter()
            .map(|r| (r.source_file_id.clone(), r.destination_key().to_string()))
            .collect()
    }
}
