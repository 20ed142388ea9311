//! OAuth refresh-token grant
//!
//! Both Zoho and Google hand out short-lived access tokens in exchange for a
//! long-lived refresh token. Zoho reports some failures as HTTP 200 with an
//! `error` field, so the body is checked as well as the status.

use crate::config::SecretString;
use crate::core::credentials::{TokenEndpoint, TokenGrant};
use crate::domain::{AuthError, FerryError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token endpoint using `grant_type=refresh_token`
pub struct OAuthRefreshEndpoint {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl OAuthRefreshEndpoint {
    /// Create an endpoint
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FerryError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret,
            refresh_token,
        })
    }

    /// The token URL
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenEndpoint for OAuthRefreshEndpoint {
    async fn request_token(&self) -> std::result::Result<TokenGrant, AuthError> {
        tracing::debug!(token_url = %self.token_url, "Requesting access token");

        let request = RefreshRequest {
            refresh_token: self.refresh_token.expose_secret().as_ref(),
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret().as_ref(),
            grant_type: "refresh_token",
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("Token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(AuthError::RefreshFailed(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::RefreshFailed(format!("Failed to parse token response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            let detail = parsed.error_description.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!(
                "Token endpoint rejected refresh: {error} {detail}"
            )));
        }

        let access_token = parsed.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AuthError::RefreshFailed("Token response has no access_token".to_string())
        })?;

        Ok(TokenGrant::new(access_token, parsed.expires_in))
    }
}
