//! State manager for the ledger and checkpoint
//!
//! Owns the in-memory ledger and writes it through to storage after every
//! upload.

use super::storage::{StateStorage, TransferredSet};
use crate::domain::{FerryError, Result, SourceFileId};
use std::sync::Arc;

/// In-memory ledger plus the last persisted checkpoint
pub struct StateManager {
    storage: Arc<dyn StateStorage>,
    ledger: TransferredSet,
    persisted_cursor: Option<usize>,
}

impl StateManager {
    /// Load state from storage
    ///
    /// A checkpoint that cannot be read is logged and treated as 0; the
    /// ledger still prevents duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Persistence`] if the ledger cannot be loaded.
    pub async fn load(storage: Arc<dyn StateStorage>) -> Result<Self> {
        let ledger = storage.load_ledger().await.map_err(into_persistence)?;

        let persisted_cursor = match storage.load_checkpoint().await {
            Ok(cursor) => cursor,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Checkpoint unreadable, starting from the beginning"
                );
                None
            }
        };

        tracing::info!(
            transferred = ledger.len(),
            checkpoint = ?persisted_cursor,
            "Loaded transfer state"
        );

        Ok(Self {
            storage,
            ledger,
            persisted_cursor,
        })
    }

    /// Index to resume from
    pub fn start_index(&self) -> usize {
        self.persisted_cursor.unwrap_or(0)
    }

    /// Whether a checkpoint was found on load (or has since been written)
    pub fn has_checkpoint(&self) -> bool {
        self.persisted_cursor.is_some()
    }

    /// Whether `id` has already been uploaded
    pub fn is_transferred(&self, id: &SourceFileId) -> bool {
        self.ledger.contains(id)
    }

    /// Number of ids in the ledger
    pub fn transferred_count(&self) -> usize {
        self.ledger.len()
    }

    /// Add `id` to the ledger and persist it
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Persistence`] if the ledger cannot be written.
    /// The id stays in memory so the rest of this run will not re-upload it.
    pub async fn record_transferred(&mut self, id: SourceFileId) -> Result<()> {
        if !self.ledger.insert(id.clone()) {
            return Ok(());
        }

        self.storage.save_ledger(&self.ledger).await.map_err(|e| {
            tracing::error!(
                source_file_id = %id,
                error = %e,
                "File uploaded but ledger not saved; add this id to the ledger by hand"
            );
            into_persistence(e)
        })
    }

    /// Persist `cursor` if it is ahead of the last persisted value
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Persistence`] if the checkpoint cannot be written.
    pub async fn checkpoint(&mut self, cursor: usize) -> Result<()> {
        if self.persisted_cursor.is_some_and(|saved| saved >= cursor) {
            return Ok(());
        }

        self.storage
            .save_checkpoint(cursor)
            .await
            .map_err(into_persistence)?;
        self.persisted_cursor = Some(cursor);

        tracing::debug!(checkpoint = cursor, "Checkpoint saved");
        Ok(())
    }

    /// Remove the checkpoint after the input has been fully walked
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Persistence`] if the checkpoint cannot be removed.
    pub async fn complete_pass(&mut self) -> Result<()> {
        self.storage
            .clear_checkpoint()
            .await
            .map_err(into_persistence)?;
        self.persisted_cursor = None;

        tracing::info!("Checkpoint cleared, next run starts a fresh pass");
        Ok(())
    }
}

fn into_persistence(err: FerryError) -> FerryError {
    match err {
        FerryError::Persistence(_) => err,
        other => FerryError::Persistence(other.to_string()),
    }
}
