//! Zoho CRM file download client

use crate::adapters::error_body;
use crate::adapters::oauth::OAuthRefreshEndpoint;
use crate::adapters::traits::SourceApi;
use crate::config::SourceConfig;
use crate::core::credentials::AccessToken;
use crate::domain::{FerryError, Result, SourceError, SourceFileId};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// Downloads attachments from the Zoho CRM files API
pub struct ZohoClient {
    client: Client,
    api_domain: String,
}

impl ZohoClient {
    /// Create a client from the `[source]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FerryError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_domain: config.api_domain.trim_end_matches('/').to_string(),
        })
    }

    /// Token endpoint for the Zoho account configured in `[source]`
    pub fn token_endpoint(config: &SourceConfig) -> Result<OAuthRefreshEndpoint> {
        OAuthRefreshEndpoint::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.refresh_token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn files_url(&self) -> String {
        format!("{}/crm/v3/files", self.api_domain)
    }
}

#[async_trait]
impl SourceApi for ZohoClient {
    async fn fetch_file(
        &self,
        id: &SourceFileId,
        token: &AccessToken,
    ) -> std::result::Result<Vec<u8>, SourceError> {
        let response = self
            .client
            .get(self.files_url())
            .query(&[("id", id.as_str())])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Zoho-oauthtoken {}", token.secret()),
            )
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| SourceError::Connection(format!("Failed to read body: {e}")))?;
                Ok(bytes.to_vec())
            }
            StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized),
            status => Err(SourceError::Http {
                status: status.as_u16(),
                message: error_body(response).await,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::core::credentials::TokenGrant;

    fn client(url: String) -> ZohoClient {
        ZohoClient::new(&SourceConfig {
            api_domain: url,
            token_url: "https://accounts.zoho.com/oauth/v2/token".to_string(),
            client_id: "id".to_string(),
            client_secret: secret_string("secret".to_string()),
            refresh_token: secret_string("refresh".to_string()),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::from_grant(TokenGrant::new("1000.abc", Some(3600)), 1)
    }

    #[tokio::test]
    async fn test_fetch_file_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/crm/v3/files")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "f-42".into()))
            .match_header("authorization", "Zoho-oauthtoken 1000.abc")
            .with_status(200)
            .with_body(vec![0xFF, 0xD8, 0xFF])
            .create_async()
            .await;

        let bytes = client(server.url())
            .fetch_file(&SourceFileId::new("f-42").unwrap(), &token())
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_file_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/crm/v3/files")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"code":"INVALID_TOKEN"}"#)
            .create_async()
            .await;

        let result = client(server.url())
            .fetch_file(&SourceFileId::new("f-42").unwrap(), &token())
            .await;
        assert_eq!(result, Err(SourceError::Unauthorized));
    }

    #[tokio::test]
    async fn test_fetch_file_other_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/crm/v3/files")
            .match_query(mockito::Matcher::Any)
            .with_status(204)
            .create_async()
            .await;

        let result = client(server.url())
            .fetch_file(&SourceFileId::new("missing").unwrap(), &token())
            .await;
        assert!(matches!(result, Err(SourceError::Http { status: 204, .. })));
    }
}
