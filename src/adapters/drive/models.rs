//! Drive v3 request and response bodies

use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Largest page Drive returns for a file listing
pub const LIST_PAGE_SIZE: u32 = 1000;

/// Fields requested from a listing
pub const LIST_FIELDS: &str = "nextPageToken,files(id,name)";

/// One page of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// A listed file or folder
#[derive(Debug, Deserialize)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Metadata sent when creating a file or folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub parents: Vec<&'a str>,
}

/// Response of a create call with `fields=id`
#[derive(Debug, Deserialize)]
pub struct CreatedFile {
    pub id: String,
}

/// Escape a value for use inside a single-quoted Drive query string
///
/// # Examples
///
/// ```
/// use ferry::adapters::drive::models::escape_query_value;
///
/// assert_eq!(escape_query_value("O'Brien"), "O\\'Brien");
/// ```
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Query for non-trashed folders, optionally by exact name and parent
pub fn folder_query(name: Option<&str>, parent: Option<&str>) -> String {
    let mut clauses = vec![
        format!("mimeType = '{FOLDER_MIME_TYPE}'"),
        "trashed = false".to_string(),
    ];
    if let Some(name) = name {
        clauses.insert(0, format!("name = '{}'", escape_query_value(name)));
    }
    if let Some(parent) = parent {
        clauses.push(format!("'{}' in parents", escape_query_value(parent)));
    }
    clauses.join(" and ")
}
