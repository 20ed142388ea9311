//! Adapter traits
//!
//! The transfer core talks to the outside world only through these traits.

use crate::core::credentials::AccessToken;
use crate::domain::{ContainerId, DestinationError, Record, Result, SourceError, SourceFileId};
use async_trait::async_trait;

/// A folder as listed by the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    /// Folder id
    pub id: ContainerId,

    /// Folder name
    pub name: String,
}

/// Ordered input records
pub trait RecordSource: Send + Sync {
    /// Load every record, in input order
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::FerryError::Input`] if the input cannot be read.
    fn load(&self) -> Result<Vec<Record>>;
}

/// The system files are copied from
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Download the content of `id` using `token`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unauthorized`] on 401 so the caller can renew
    /// the token and retry.
    async fn fetch_file(
        &self,
        id: &SourceFileId,
        token: &AccessToken,
    ) -> std::result::Result<Vec<u8>, SourceError>;
}

/// The system files are copied to
///
/// Implementations manage their own credentials.
#[async_trait]
pub trait DestinationApi: Send + Sync {
    /// List non-trashed folders, optionally filtered by exact name and parent
    async fn list_folders(
        &self,
        name: Option<&str>,
        parent: Option<&ContainerId>,
    ) -> std::result::Result<Vec<RemoteFolder>, DestinationError>;

    /// Create a folder and return its id
    async fn create_folder(
        &self,
        name: &str,
        parent: &ContainerId,
    ) -> std::result::Result<ContainerId, DestinationError>;

    /// Upload a file and return its id
    async fn create_file(
        &self,
        name: &str,
        parent: &ContainerId,
        content: Vec<u8>,
        mime_type: &str,
    ) -> std::result::Result<String, DestinationError>;
}
