//! Access token lifecycle
//!
//! Each remote (Zoho CRM, Google Drive) gets its own [`CredentialManager`]
//! fed by a [`TokenEndpoint`]. The manager publishes tokens through a watch
//! channel: one writer, any number of readers, whole-value replacement.

pub mod manager;
pub mod token;

pub use manager::CredentialManager;
pub use token::{AccessToken, TokenEndpoint, TokenGrant};
