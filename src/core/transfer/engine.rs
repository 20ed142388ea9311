//! Transfer engine
//!
//! Walks the run window one record at a time:
//! ledger gate, folder resolution, source fetch, upload, ledger write,
//! checkpoint advance, pacing delay.

use super::outcome::{RecordOutcome, SkipReason, TransferStage};
use super::pacer::{BatchPacer, PacingPolicy};
use super::summary::TransferSummary;
use crate::adapters::traits::{DestinationApi, SourceApi};
use crate::config::{CheckpointPolicy, CredentialMode};
use crate::core::credentials::CredentialManager;
use crate::core::resolver::{ContainerCache, DestinationResolver};
use crate::core::state::{CheckpointCursor, StateManager};
use crate::domain::record::UPLOAD_MIME_TYPE;
use crate::domain::{ContainerId, FerryError, Record, Result, SourceError, SourceFileId};
use crate::{log_batch_progress, log_record_failure};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Run settings for the engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Folder under which record folders live
    pub parent: ContainerId,
    pub pacing: PacingPolicy,
    pub credential_mode: CredentialMode,
    pub checkpoint_policy: CheckpointPolicy,
}

/// Processes records sequentially
pub struct TransferEngine {
    source: Arc<dyn SourceApi>,
    destination: Arc<dyn DestinationApi>,
    source_credentials: Arc<CredentialManager>,
    resolver: DestinationResolver,
    state: StateManager,
    pacer: BatchPacer,
    parent: ContainerId,
    credential_mode: CredentialMode,
    checkpoint_policy: CheckpointPolicy,
    shutdown: watch::Receiver<bool>,
}

impl TransferEngine {
    pub fn new(
        source: Arc<dyn SourceApi>,
        destination: Arc<dyn DestinationApi>,
        source_credentials: Arc<CredentialManager>,
        state: StateManager,
        options: EngineOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let resolver = DestinationResolver::new(
            Arc::clone(&destination),
            ContainerCache::new(),
            options.pacing.folder_settle_delay,
        );

        Self {
            source,
            destination,
            source_credentials,
            resolver,
            state,
            pacer: BatchPacer::new(options.pacing),
            parent: options.parent,
            credential_mode: options.credential_mode,
            checkpoint_policy: options.checkpoint_policy,
            shutdown,
        }
    }

    /// Fill the folder cache from the folders already under the parent
    pub async fn prime_cache(&mut self) -> usize {
        let parent = self.parent.clone();
        self.resolver.prime(&parent).await
    }

    /// Index the run will start from
    pub fn start_index(&self) -> usize {
        self.state.start_index()
    }

    /// Process the run window over `records`
    ///
    /// Per-record failures are counted in the summary and do not stop the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns a fatal error (ledger or checkpoint not persisted, or no usable
    /// credential left). Ledger and checkpoint keep their last persisted
    /// values. A failed token refresh at a batch boundary is not an error: the
    /// run stops with the checkpoint saved and `credential_halt` set.
    pub async fn run(&mut self, records: &[Record]) -> Result<TransferSummary> {
        let started = Instant::now();
        let total = records.len();
        let window = self.pacer.policy().window(self.state.start_index(), total);
        let mut summary = TransferSummary::new(total, window.start);
        let mut cursor = CheckpointCursor::new(window.start);

        tracing::info!(
            start_index = window.start,
            end_index = window.end,
            total = total,
            already_transferred = self.state.transferred_count(),
            "Starting transfer"
        );

        for index in window.clone() {
            if *self.shutdown.borrow() {
                tracing::warn!(index = index, "Shutdown requested, stopping before next record");
                summary.interrupted = true;
                break;
            }

            let record = &records[index];
            let outcome = self.process_record(index, record).await?;
            summary.add_outcome(index, record.source_file_id.trim(), &outcome);

            if outcome.is_settled() {
                cursor.settle(index);
            } else {
                cursor.fail(index);
            }

            let mut boundary = false;
            if let RecordOutcome::Recorded { .. } = outcome {
                boundary = self.pacer.record_success();
                if boundary && !self.on_batch_boundary(index + 1, total).await {
                    summary.credential_halt = true;
                    break;
                }
            }

            let persist = match self.checkpoint_policy {
                CheckpointPolicy::EveryRecord => true,
                CheckpointPolicy::BatchBoundary => boundary,
            };
            if persist {
                self.state.checkpoint(cursor.position()).await?;
            }

            if let RecordOutcome::Recorded { .. } = outcome {
                self.pacer.after_upload().await;
            }
        }

        let reached_end = !summary.interrupted && !summary.credential_halt && window.end == total;
        if reached_end {
            self.state.complete_pass().await?;
            summary.checkpoint_cleared = true;
        } else {
            self.state.checkpoint(cursor.position()).await?;
        }

        if !cursor.failures().is_empty() {
            tracing::warn!(
                failed_indices = ?cursor.failures(),
                "Failed records will be retried on the next full pass"
            );
        }

        summary.next_index = cursor.position();
        summary.folders_created = self.resolver.folders_created();
        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Log batch progress and, in synchronous mode, refresh the source token
    ///
    /// Returns false when the refresh failed and the run has to stop.
    async fn on_batch_boundary(&self, next_index: usize, total: usize) -> bool {
        log_batch_progress!(self.pacer.batches_completed(), next_index, total);

        if self.credential_mode != CredentialMode::Synchronous {
            return true;
        }
        match self.source_credentials.refresh().await {
            Ok(token) => {
                tracing::info!(generation = token.generation, "Refreshed source token at batch boundary");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    next_index = next_index,
                    "Failed to refresh source token, stopping run"
                );
                false
            }
        }
    }

    /// Process one record
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned; everything else becomes
    /// [`RecordOutcome::Failed`].
    pub async fn process_record(&mut self, index: usize, record: &Record) -> Result<RecordOutcome> {
        let Some(id) = record.source_id() else {
            tracing::warn!(index = index, "Record has no source file id, skipping");
            return Ok(RecordOutcome::Skipped(SkipReason::EmptySourceId));
        };

        if self.state.is_transferred(&id) {
            tracing::info!(index = index, source_file_id = %id, "Already transferred, skipping");
            return Ok(RecordOutcome::Skipped(SkipReason::AlreadyTransferred));
        }

        let key = record.destination_key();
        let resolution = match self.resolver.resolve(&key, &self.parent).await {
            Ok(resolution) => resolution,
            Err(e) => return self.fail_or_abort(index, &id, TransferStage::ResolveDestination, e),
        };

        let content = match self.fetch_with_recovery(&id).await {
            Ok(content) => content,
            Err(e) => return self.fail_or_abort(index, &id, TransferStage::FetchSource, e),
        };
        tracing::debug!(index = index, source_file_id = %id, bytes = content.len(), "Fetched source file");

        let file_name = record.file_name_for(&id);
        match self
            .destination
            .create_file(&file_name, &resolution.container_id, content, UPLOAD_MIME_TYPE)
            .await
        {
            Ok(file_id) => {
                tracing::info!(
                    index = index,
                    source_file_id = %id,
                    folder = %key,
                    file_name = %file_name,
                    destination_file_id = %file_id,
                    "Uploaded file"
                );
            }
            Err(e) => {
                return self.fail_or_abort(index, &id, TransferStage::Upload, e.into());
            }
        }

        if let Err(e) = self.state.record_transferred(id.clone()).await {
            log_record_failure!(index, id, TransferStage::Record, e);
            return Err(e);
        }

        Ok(RecordOutcome::Recorded {
            source_file_id: id,
            container_id: resolution.container_id,
            origin: resolution.origin,
        })
    }

    /// Fetch `id`, renewing the token once on 401
    async fn fetch_with_recovery(&self, id: &SourceFileId) -> Result<Vec<u8>> {
        let token = self.source_credentials.current_token()?;

        match self.source.fetch_file(id, &token).await {
            Ok(content) => Ok(content),
            Err(SourceError::Unauthorized) => {
                let renewed = self
                    .source_credentials
                    .recover_from_unauthorized(&token)
                    .await?;
                tracing::info!(
                    source_file_id = %id,
                    generation = renewed.generation,
                    "Retrying fetch with renewed token"
                );
                Ok(self.source.fetch_file(id, &renewed).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn fail_or_abort(
        &self,
        index: usize,
        id: &SourceFileId,
        stage: TransferStage,
        err: FerryError,
    ) -> Result<RecordOutcome> {
        log_record_failure!(index, id, stage, err);
        if err.is_fatal() {
            return Err(err);
        }
        Ok(RecordOutcome::failed(stage, err.to_string()))
    }
}
