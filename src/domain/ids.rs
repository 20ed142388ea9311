//! Domain identifier types with validation
//!
//! Newtype wrappers keep source file ids, destination folder ids and folder
//! keys from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator placed between grouping fields when building a [`DestinationKey`]
pub const KEY_SEPARATOR: &str = "_";

/// Source file identifier (Zoho CRM `File_Id__s`)
///
/// # Examples
///
/// ```
/// use ferry::domain::ids::SourceFileId;
/// use std::str::FromStr;
///
/// let id = SourceFileId::from_str("a1b2c3").unwrap();
/// assert_eq!(id.as_str(), "a1b2c3");
/// assert!(SourceFileId::from_str("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFileId(String);

impl SourceFileId {
    /// Creates a new SourceFileId, rejecting empty or whitespace-only ids
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Source file ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SourceFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceFileId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SourceFileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remote folder identifier (Google Drive file id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new ContainerId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Container ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContainerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Destination folder name derived from a record's grouping fields
///
/// The key is the exact concatenation of the fields joined by
/// [`KEY_SEPARATOR`]. No trimming or case folding is applied: folders created
/// by earlier runs are matched by this exact string.
///
/// # Examples
///
/// ```
/// use ferry::domain::ids::DestinationKey;
///
/// let key = DestinationKey::from_fields(&["Jane Doe", "1 Main St ", "W-7"]);
/// assert_eq!(key.as_str(), "Jane Doe_1 Main St _W-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationKey(String);

impl DestinationKey {
    /// Builds a key from ordered grouping fields
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let parts: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        Self(parts.join(KEY_SEPARATOR))
    }

    /// Wraps an existing folder name (e.g. from a remote listing)
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DestinationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
