//! Folder id cache

use crate::domain::{ContainerId, DestinationKey};
use std::collections::HashMap;

/// Known folder ids by key, for one parent folder
///
/// Entries live for the whole run; there is no eviction.
#[derive(Debug, Default, Clone)]
pub struct ContainerCache {
    entries: HashMap<DestinationKey, ContainerId>,
}

impl ContainerCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached id for `key`
    pub fn get(&self, key: &DestinationKey) -> Option<&ContainerId> {
        self.entries.get(key)
    }

    /// Store `id` for `key`, replacing any previous entry
    pub fn insert(&mut self, key: DestinationKey, id: ContainerId) {
        self.entries.insert(key, id);
    }

    /// Store `id` only if `key` is not cached yet; returns whether it was stored
    pub fn insert_if_absent(&mut self, key: DestinationKey, id: ContainerId) -> bool {
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
