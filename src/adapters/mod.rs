//! External system integrations for Ferry.
//!
//! - [`zoho`] - Zoho CRM file downloads
//! - [`drive`] - Google Drive folders and uploads
//! - [`oauth`] - OAuth refresh-token grant shared by both
//! - [`records`] - CSV record input
//! - [`traits`] - The seams the transfer core depends on
//!
//! Adapters never leak `reqwest` types: failures are mapped to the domain
//! error enums before they cross the trait boundary.

pub mod drive;
pub mod oauth;
pub mod records;
pub mod traits;
pub mod zoho;

pub use traits::{DestinationApi, RecordSource, RemoteFolder, SourceApi};

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Read a failed response's body for an error message, cut at a char boundary
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
