//! Transfer coordinator
//!
//! Wires configuration to adapters and runs the startup sequence:
//! load records, load state, obtain tokens, start renewal if configured,
//! prime the folder cache. The run itself is delegated to the engine.

use super::engine::{EngineOptions, TransferEngine};
use super::pacer::PacingPolicy;
use super::summary::TransferSummary;
use crate::adapters::drive::{AuthorizedUserCredentials, DriveClient};
use crate::adapters::records::CsvRecordSource;
use crate::adapters::traits::{DestinationApi, RecordSource, SourceApi};
use crate::adapters::zoho::ZohoClient;
use crate::config::{CheckpointPolicy, CredentialMode, FerryConfig};
use crate::core::credentials::CredentialManager;
use crate::core::state::{FileStateStorage, StateManager, StateStorage};
use crate::domain::{AuthError, ContainerId, FerryError, Record, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything the coordinator talks to
pub struct TransferComponents {
    pub records: Arc<dyn RecordSource>,
    pub storage: Arc<dyn StateStorage>,
    pub source: Arc<dyn SourceApi>,
    pub destination: Arc<dyn DestinationApi>,
    pub source_credentials: Arc<CredentialManager>,
    /// Present when the destination adapter uses a managed token
    pub destination_credentials: Option<Arc<CredentialManager>>,
}

/// Run settings derived from configuration
#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub parent: ContainerId,
    pub pacing: PacingPolicy,
    pub credential_mode: CredentialMode,
    pub checkpoint_policy: CheckpointPolicy,
    pub renewal_interval: Duration,
    pub renewal_retry_backoff: Duration,
}

impl TransferSettings {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parent folder id is empty.
    pub fn from_config(config: &FerryConfig) -> Result<Self> {
        let parent = ContainerId::new(config.destination.parent_folder_id.trim())
            .map_err(FerryError::Configuration)?;

        Ok(Self {
            parent,
            pacing: PacingPolicy::from_config(&config.transfer),
            credential_mode: config.transfer.credential_mode,
            checkpoint_policy: config.transfer.checkpoint_policy,
            renewal_interval: Duration::from_secs(config.transfer.renewal_interval_seconds),
            renewal_retry_backoff: Duration::from_millis(config.transfer.renewal_retry_backoff_ms),
        })
    }
}

/// Startup sequence for a transfer run
pub struct TransferCoordinator {
    components: TransferComponents,
    settings: TransferSettings,
    shutdown: watch::Receiver<bool>,
}

impl TransferCoordinator {
    pub fn new(
        components: TransferComponents,
        settings: TransferSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            components,
            settings,
            shutdown,
        }
    }

    /// Build the production adapters from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the destination credentials file is missing or
    /// invalid, or an HTTP client cannot be built.
    pub fn from_config(config: &FerryConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let settings = TransferSettings::from_config(config)?;

        let source_credentials = Arc::new(CredentialManager::new(
            "zoho",
            Arc::new(ZohoClient::token_endpoint(&config.source)?),
        ));
        let source = Arc::new(ZohoClient::new(&config.source)?);

        let drive_endpoint = AuthorizedUserCredentials::from_file(&config.destination.credentials_file)?
            .into_endpoint(Duration::from_secs(config.destination.timeout_seconds))?;
        let destination_credentials = Arc::new(CredentialManager::new("drive", Arc::new(drive_endpoint)));
        let destination = Arc::new(DriveClient::new(
            &config.destination,
            Arc::clone(&destination_credentials),
        )?);

        let components = TransferComponents {
            records: Arc::new(CsvRecordSource::from_config(&config.input)),
            storage: Arc::new(FileStateStorage::new(
                &config.state.checkpoint_path,
                &config.state.ledger_path,
            )),
            source,
            destination,
            source_credentials,
            destination_credentials: Some(destination_credentials),
        };

        Ok(Self::new(components, settings, shutdown))
    }

    /// Run the startup sequence
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, the ledger cannot be
    /// loaded, or an initial access token cannot be obtained.
    pub async fn prepare(self) -> Result<PreparedTransfer> {
        let TransferComponents {
            records,
            storage,
            source,
            destination,
            source_credentials,
            destination_credentials,
        } = self.components;

        let records = records.load()?;
        let state = StateManager::load(storage).await?;

        initial_token(&source_credentials).await?;
        if let Some(credentials) = &destination_credentials {
            initial_token(credentials).await?;
        }

        let mut renewals = Vec::new();
        if self.settings.credential_mode == CredentialMode::Background {
            renewals.push(source_credentials.spawn_renewal(
                self.settings.renewal_interval,
                self.settings.renewal_retry_backoff,
            ));
            if let Some(credentials) = &destination_credentials {
                renewals.push(credentials.spawn_renewal(
                    self.settings.renewal_interval,
                    self.settings.renewal_retry_backoff,
                ));
            }
        }

        let mut engine = TransferEngine::new(
            source,
            destination,
            source_credentials,
            state,
            EngineOptions {
                parent: self.settings.parent.clone(),
                pacing: self.settings.pacing.clone(),
                credential_mode: self.settings.credential_mode,
                checkpoint_policy: self.settings.checkpoint_policy,
            },
            self.shutdown,
        );
        engine.prime_cache().await;

        Ok(PreparedTransfer {
            engine,
            records,
            renewals,
        })
    }
}

async fn initial_token(credentials: &CredentialManager) -> Result<()> {
    let token = credentials.refresh().await.map_err(|e| {
        AuthError::NoUsableCredential(format!("initial {} token: {}", credentials.name(), e))
    })?;
    tracing::info!(
        credential = credentials.name(),
        generation = token.generation,
        "Obtained initial access token"
    );
    Ok(())
}

/// A transfer whose startup sequence has completed
pub struct PreparedTransfer {
    engine: TransferEngine,
    records: Vec<Record>,
    renewals: Vec<JoinHandle<()>>,
}

impl PreparedTransfer {
    /// Number of input records
    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Index the run will start from
    pub fn start_index(&self) -> usize {
        self.engine.start_index()
    }

    /// Run the engine, then stop any background renewal
    ///
    /// # Errors
    ///
    /// Returns a fatal run-level error; see [`TransferEngine::run`].
    pub async fn run(mut self) -> Result<TransferSummary> {
        let result = self.engine.run(&self.records).await;
        for handle in &self.renewals {
            handle.abort();
        }
        result
    }
}

impl Drop for PreparedTransfer {
    fn drop(&mut self) {
        for handle in &self.renewals {
            handle.abort();
        }
    }
}
