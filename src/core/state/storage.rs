//! State storage backends

use crate::domain::{FerryError, Result, SourceFileId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Ids of every file already uploaded
pub type TransferredSet = BTreeSet<SourceFileId>;

/// Persistence for the checkpoint cursor and the ledger
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load the checkpoint cursor
    ///
    /// Returns `Ok(None)` when no checkpoint exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint exists but cannot be read or parsed.
    async fn load_checkpoint(&self) -> Result<Option<usize>>;

    /// Persist the checkpoint cursor
    async fn save_checkpoint(&self, cursor: usize) -> Result<()>;

    /// Remove the checkpoint; a missing checkpoint is not an error
    async fn clear_checkpoint(&self) -> Result<()>;

    /// Load the ledger; a missing ledger is an empty set
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger exists but cannot be read or parsed.
    async fn load_ledger(&self) -> Result<TransferredSet>;

    /// Persist the whole ledger
    async fn save_ledger(&self, ledger: &TransferredSet) -> Result<()>;
}

/// File-backed state: a text cursor and a JSON array of ids
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so an interrupted write never leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    checkpoint_path: PathBuf,
    ledger_path: PathBuf,
}

impl FileStateStorage {
    /// Create a storage over the two given paths
    pub fn new(checkpoint_path: impl Into<PathBuf>, ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_path: checkpoint_path.into(),
            ledger_path: ledger_path.into(),
        }
    }

    /// Path of the checkpoint file
    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    /// Path of the ledger file
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    async fn write_replace(path: &Path, contents: &[u8]) -> Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, contents).await.map_err(|e| {
            FerryError::Persistence(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            FerryError::Persistence(format!(
                "Failed to move {} into place at {}: {}",
                tmp.display(),
                path.display(),
                e
            ))
        })
    }

    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FerryError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn load_checkpoint(&self) -> Result<Option<usize>> {
        let Some(contents) = Self::read_optional(&self.checkpoint_path).await? else {
            return Ok(None);
        };

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse::<usize>().map(Some).map_err(|e| {
            FerryError::Persistence(format!(
                "Checkpoint {} holds '{}', not an index: {}",
                self.checkpoint_path.display(),
                trimmed,
                e
            ))
        })
    }

    async fn save_checkpoint(&self, cursor: usize) -> Result<()> {
        Self::write_replace(&self.checkpoint_path, cursor.to_string().as_bytes()).await
    }

    async fn clear_checkpoint(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.checkpoint_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FerryError::Persistence(format!(
                "Failed to remove {}: {}",
                self.checkpoint_path.display(),
                e
            ))),
        }
    }

    async fn load_ledger(&self) -> Result<TransferredSet> {
        let Some(contents) = Self::read_optional(&self.ledger_path).await? else {
            return Ok(TransferredSet::new());
        };

        let ids: Vec<String> = serde_json::from_str(&contents).map_err(|e| {
            FerryError::Persistence(format!(
                "Ledger {} is not a JSON list of ids: {}",
                self.ledger_path.display(),
                e
            ))
        })?;

        Ok(ids
            .into_iter()
            .filter_map(|id| SourceFileId::new(id).ok())
            .collect())
    }

    async fn save_ledger(&self, ledger: &TransferredSet) -> Result<()> {
        let json = serde_json::to_string_pretty(ledger).map_err(|e| {
            FerryError::Persistence(format!("Failed to serialize ledger: {e}"))
        })?;
        Self::write_replace(&self.ledger_path, json.as_bytes()).await
    }
}
