//! Input record model
//!
//! A record is one row of the input sequence: the file to transfer plus the
//! attributes that decide its destination folder and file name.

use super::ids::{DestinationKey, SourceFileId};
use serde::{Deserialize, Serialize};

/// Extension appended to every uploaded file name
pub const FILE_EXTENSION: &str = "jpg";

/// MIME type sent with every upload
pub const UPLOAD_MIME_TYPE: &str = "image/jpeg";

/// One input record
///
/// # Examples
///
/// ```
/// use ferry::domain::Record;
///
/// let record = Record::new("f-1", vec!["Jane".into(), "Main St".into()], "front");
/// assert_eq!(record.destination_key().as_str(), "Jane_Main St");
/// assert_eq!(record.file_name().as_deref(), Some("front_f-1.jpg"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Source file id; empty means the record has nothing to transfer
    pub source_file_id: String,

    /// Ordered fields that make up the destination folder name
    pub grouping_fields: Vec<String>,

    /// Field used in the destination file name
    pub label: String,
}

impl Record {
    /// Create a new record
    pub fn new(
        source_file_id: impl Into<String>,
        grouping_fields: Vec<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source_file_id: source_file_id.into(),
            grouping_fields,
            label: label.into(),
        }
    }

    /// The source id, or `None` when the record carries no file
    pub fn source_id(&self) -> Option<SourceFileId> {
        SourceFileId::new(self.source_file_id.as_str()).ok()
    }

    /// Destination folder key for this record
    pub fn destination_key(&self) -> DestinationKey {
        DestinationKey::from_fields(&self.grouping_fields)
    }

    /// Destination file name: `{label}_{source_file_id}.jpg`
    pub fn file_name(&self) -> Option<String> {
        self.source_id().map(|id| self.file_name_for(&id))
    }

    /// Destination file name for an already validated id
    pub fn file_name_for(&self, id: &SourceFileId) -> String {
        format!("{}_{}.{}", self.label, id, FILE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_source_id() {
        let record = Record::new("", vec!["X".into()], "label");
        assert!(record.source_id().is_none());
        assert!(record.file_name().is_none());
    }

    #[test]
    fn test_file_name_with_empty_label() {
        let record = Record::new("42", vec![], "");
        assert_eq!(record.file_name().as_deref(), Some("_42.jpg"));
    }

    #[test]
    fn test_destination_key_from_record() {
        let record = Record::new(
            "42",
            vec!["Jane Doe".into(), "1 Main St".into(), "W-9".into()],
            "front",
        );
        assert_eq!(record.destination_key().as_str(), "Jane Doe_1 Main St_W-9");
    }
}
