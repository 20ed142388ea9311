//! Google Drive destination adapter
//!
//! Talks to the Drive v3 REST API directly. The bearer token comes from a
//! [`CredentialManager`](crate::core::credentials::CredentialManager) fed by
//! an authorized-user credentials file.

pub mod client;
pub mod credentials;
pub mod models;

pub use client::DriveClient;
pub use credentials::AuthorizedUserCredentials;
