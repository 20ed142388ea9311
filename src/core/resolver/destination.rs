//! Destination resolver

use super::cache::ContainerCache;
use crate::adapters::traits::DestinationApi;
use crate::domain::{ContainerId, DestinationKey, Result};
use std::sync::Arc;
use std::time::Duration;

/// Where a resolved folder id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// Found in the cache; no remote call
    Cache,
    /// Found by a remote name lookup
    Lookup,
    /// Created remotely
    Created,
}

/// A resolved destination folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub container_id: ContainerId,
    pub origin: ResolutionOrigin,
}

/// Resolves destination keys to folder ids, creating folders on demand
///
/// For a given parent, at most one folder is created per key during a run.
pub struct DestinationResolver {
    destination: Arc<dyn DestinationApi>,
    cache: ContainerCache,
    settle_delay: Duration,
    folders_created: usize,
}

impl DestinationResolver {
    /// Create a resolver with an injected cache
    ///
    /// `settle_delay` is slept after every folder create.
    pub fn new(
        destination: Arc<dyn DestinationApi>,
        cache: ContainerCache,
        settle_delay: Duration,
    ) -> Self {
        Self {
            destination,
            cache,
            settle_delay,
            folders_created: 0,
        }
    }

    /// Fill the cache from a listing of every folder under `parent`
    ///
    /// On duplicate names the first listed folder wins. A listing failure is
    /// logged and leaves the cache as it was.
    ///
    /// Returns the number of folders added.
    pub async fn prime(&mut self, parent: &ContainerId) -> usize {
        let folders = match self.destination.list_folders(None, Some(parent)).await {
            Ok(folders) => folders,
            Err(e) => {
                tracing::error!(
                    parent = %parent,
                    error = %e,
                    "Could not list existing folders, continuing with an empty cache"
                );
                return 0;
            }
        };

        let listed = folders.len();
        let mut added = 0;
        for folder in folders {
            if self
                .cache
                .insert_if_absent(DestinationKey::from_name(folder.name), folder.id)
            {
                added += 1;
            }
        }

        tracing::info!(
            parent = %parent,
            listed = listed,
            cached = added,
            "Primed folder cache"
        );
        added
    }

    /// Resolve `key` to a folder under `parent`
    ///
    /// # Errors
    ///
    /// Returns the destination error if the lookup or the create fails.
    /// Nothing is cached in that case.
    pub async fn resolve(
        &mut self,
        key: &DestinationKey,
        parent: &ContainerId,
    ) -> Result<Resolution> {
        if let Some(id) = self.cache.get(key) {
            tracing::debug!(folder = %key, container_id = %id, "Folder found in cache");
            return Ok(Resolution {
                container_id: id.clone(),
                origin: ResolutionOrigin::Cache,
            });
        }

        let existing = self
            .destination
            .list_folders(Some(key.as_str()), Some(parent))
            .await
            .map_err(|e| {
                tracing::error!(folder = %key, error = %e, "Folder lookup failed");
                e
            })?;

        if let Some(folder) = existing.into_iter().next() {
            tracing::info!(folder = %key, container_id = %folder.id, "Found existing folder");
            self.cache.insert(key.clone(), folder.id.clone());
            return Ok(Resolution {
                container_id: folder.id,
                origin: ResolutionOrigin::Lookup,
            });
        }

        let id = self
            .destination
            .create_folder(key.as_str(), parent)
            .await
            .map_err(|e| {
                tracing::error!(folder = %key, error = %e, "Folder creation failed");
                e
            })?;

        tracing::info!(folder = %key, container_id = %id, "Created folder");
        self.cache.insert(key.clone(), id.clone());
        self.folders_created += 1;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(Resolution {
            container_id: id,
            origin: ResolutionOrigin::Created,
        })
    }

    /// Folders created by this resolver
    pub fn folders_created(&self) -> usize {
        self.folders_created
    }

    /// The cache, for inspection
    pub fn cache(&self) -> &ContainerCache {
        &self.cache
    }
}
