//! Authorized-user credentials file
//!
//! The file format written by `gcloud auth application-default login` and
//! by OAuth desktop flows:
//!
//! ```json
//! {
//!   "type": "authorized_user",
//!   "client_id": "....apps.googleusercontent.com",
//!   "client_secret": "...",
//!   "refresh_token": "..."
//! }
//! ```

use crate::adapters::oauth::OAuthRefreshEndpoint;
use crate::config::SecretString;
use crate::domain::{AuthError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Google's OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Contents of an authorized-user credentials file
#[derive(Debug, Deserialize)]
pub struct AuthorizedUserCredentials {
    #[serde(rename = "type", default)]
    pub credential_type: Option<String>,
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl AuthorizedUserCredentials {
    /// Read and validate a credentials file
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentialFile`] if the file is missing,
    /// is not JSON of the expected shape, or holds a different credential
    /// type (such as a service account key).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthError::InvalidCredentialFile(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&contents).map_err(|e| match e {
            crate::domain::FerryError::Auth(AuthError::InvalidCredentialFile(msg)) => {
                AuthError::InvalidCredentialFile(format!("{}: {}", path.display(), msg)).into()
            }
            other => other,
        })
    }

    /// Parse credentials from JSON text
    pub fn from_json(contents: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(contents)
            .map_err(|e| AuthError::InvalidCredentialFile(format!("not an authorized-user file: {e}")))?;

        match credentials.credential_type.as_deref() {
            None | Some("authorized_user") => Ok(credentials),
            Some(other) => Err(AuthError::InvalidCredentialFile(format!(
                "credential type '{other}' is not supported, expected 'authorized_user'"
            ))
            .into()),
        }
    }

    /// The token endpoint these credentials refresh against
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    /// Build a token endpoint for these credentials
    pub fn into_endpoint(self, timeout: Duration) -> Result<OAuthRefreshEndpoint> {
        let token_uri = self.token_uri().to_string();
        OAuthRefreshEndpoint::new(
            token_uri,
            self.client_id,
            self.client_secret,
            self.refresh_token,
            timeout,
        )
    }
}
