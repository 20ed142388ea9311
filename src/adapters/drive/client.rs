//! Google Drive v3 REST client

use super::models::{
    folder_query, CreatedFile, FileList, FileMetadata, FOLDER_MIME_TYPE, LIST_FIELDS,
    LIST_PAGE_SIZE,
};
use crate::adapters::error_body;
use crate::adapters::traits::{DestinationApi, RemoteFolder};
use crate::config::DestinationConfig;
use crate::core::credentials::CredentialManager;
use crate::domain::{ContainerId, DestinationError, FerryError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

type DriveResult<T> = std::result::Result<T, DestinationError>;

/// Drive client authenticated through a [`CredentialManager`]
///
/// A 401 triggers one token recovery and one retry of the same request.
pub struct DriveClient {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
}

impl DriveClient {
    /// Create a client from the `[destination]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &DestinationConfig, credentials: Arc<CredentialManager>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FerryError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/drive/v3/files", self.base_url)
    }

    /// Send a request built by `build` with the current bearer token
    async fn send_authorized<F>(&self, build: F) -> DriveResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self
            .credentials
            .current_token()
            .map_err(DestinationError::Credential)?;

        let response = build(&self.client)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| DestinationError::Connection(e.to_string()))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let renewed = self
            .credentials
            .recover_from_unauthorized(&token)
            .await
            .map_err(DestinationError::Credential)?;

        let response = build(&self.client)
            .bearer_auth(renewed.secret())
            .send()
            .await
            .map_err(|e| DestinationError::Connection(e.to_string()))?;

        check_status(response).await
    }

    async fn list_page(&self, query: &str, page_token: Option<&str>) -> DriveResult<FileList> {
        let url = self.files_url();
        let page_size = LIST_PAGE_SIZE.to_string();
        let response = self
            .send_authorized(|client| {
                let mut params = vec![
                    ("q", query),
                    ("spaces", "drive"),
                    ("fields", LIST_FIELDS),
                    ("pageSize", page_size.as_str()),
                ];
                if let Some(token) = page_token {
                    params.push(("pageToken", token));
                }
                client.get(&url).query(&params)
            })
            .await?;

        response
            .json::<FileList>()
            .await
            .map_err(|e| DestinationError::InvalidResponse(format!("files.list: {e}")))
    }
}

#[async_trait]
impl DestinationApi for DriveClient {
    async fn list_folders(
        &self,
        name: Option<&str>,
        parent: Option<&ContainerId>,
    ) -> DriveResult<Vec<RemoteFolder>> {
        let query = folder_query(name, parent.map(ContainerId::as_str));
        let mut folders = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.list_page(&query, page_token.as_deref()).await?;
            pages += 1;

            for file in page.files {
                match ContainerId::new(file.id) {
                    Ok(id) => folders.push(RemoteFolder {
                        id,
                        name: file.name,
                    }),
                    Err(e) => tracing::warn!(error = %e, "Skipping listed folder without id"),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(
            query = %query,
            pages = pages,
            folders = folders.len(),
            "Listed folders"
        );
        Ok(folders)
    }

    async fn create_folder(&self, name: &str, parent: &ContainerId) -> DriveResult<ContainerId> {
        let url = self.files_url();
        let metadata = FileMetadata {
            name,
            mime_type: FOLDER_MIME_TYPE,
            parents: vec![parent.as_str()],
        };

        let response = self
            .send_authorized(|client| client.post(&url).query(&[("fields", "id")]).json(&metadata))
            .await?;

        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| DestinationError::InvalidResponse(format!("files.create: {e}")))?;

        ContainerId::new(created.id).map_err(DestinationError::InvalidResponse)
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &ContainerId,
        content: Vec<u8>,
        mime_type: &str,
    ) -> DriveResult<String> {
        let url = self.upload_url();
        let metadata = FileMetadata {
            name,
            mime_type,
            parents: vec![parent.as_str()],
        };
        let metadata_json = serde_json::to_vec(&metadata)
            .map_err(|e| DestinationError::InvalidResponse(format!("metadata: {e}")))?;

        let boundary = format!("ferry-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata_json, mime_type, &content);
        let content_type = format!("multipart/related; boundary={boundary}");

        let response = self
            .send_authorized(|client| {
                client
                    .post(&url)
                    .query(&[("uploadType", "multipart"), ("fields", "id")])
                    .header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                    .body(body.clone())
            })
            .await?;

        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| DestinationError::InvalidResponse(format!("files.create upload: {e}")))?;
        Ok(created.id)
    }
}

async fn check_status(response: Response) -> DriveResult<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(DestinationError::Unauthorized);
    }
    if !status.is_success() {
        return Err(DestinationError::Http {
            status: status.as_u16(),
            message: error_body(response).await,
        });
    }
    Ok(response)
}

/// Build a two-part `multipart/related` body: JSON metadata, then media
fn multipart_related(boundary: &str, metadata: &[u8], mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::{TokenEndpoint, TokenGrant};
    use crate::domain::AuthError;
    use mockito::Matcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEndpoint {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenEndpoint for CountingEndpoint {
        async fn request_token(&self) -> std::result::Result<TokenGrant, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenGrant::new(format!("ya29.token-{n}"), Some(3600)))
        }
    }

    async fn client(url: String) -> DriveClient {
        let credentials = Arc::new(CredentialManager::new(
            "drive",
            Arc::new(CountingEndpoint {
                calls: AtomicUsize::new(0),
            }),
        ));
        credentials.refresh().await.unwrap();

        let config = DestinationConfig {
            credentials_file: "unused.json".to_string(),
            parent_folder_id: "parent-1".to_string(),
            api_base_url: url,
            timeout_seconds: 5,
        };
        DriveClient::new(&config, credentials).unwrap()
    }

    fn parent() -> ContainerId {
        ContainerId::new("parent-1").unwrap()
    }

    #[tokio::test]
    async fn test_list_folders_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        // The page-token mock is registered first so it wins for the second request
        let second = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
            .with_status(200)
            .with_body(r#"{"files":[{"id":"f2","name":"B"}]}"#)
            .create_async()
            .await;
        let first = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("spaces".into(), "drive".into()),
                Matcher::UrlEncoded("pageSize".into(), "1000".into()),
                Matcher::Regex("q=".into()),
            ]))
            .match_header("authorization", "Bearer ya29.token-1")
            .with_status(200)
            .with_body(r#"{"nextPageToken":"p2","files":[{"id":"f1","name":"A"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let folders = client(server.url())
            .await
            .list_folders(None, Some(&parent()))
            .await
            .unwrap();

        let names: Vec<_> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_folders_escapes_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                "name = 'O\\'Brien_1 Main St_W1' and mimeType = 'application/vnd.google-apps.folder' and trashed = false and 'parent-1' in parents".into(),
            ))
            .with_status(200)
            .with_body(r#"{"files":[]}"#)
            .create_async()
            .await;

        let folders = client(server.url())
            .await
            .list_folders(Some("O'Brien_1 Main St_W1"), Some(&parent()))
            .await
            .unwrap();

        assert!(folders.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_folder() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded("fields".into(), "id".into()))
            .match_body(Matcher::Json(serde_json::json!({
                "name": "Jane_Main St_W1",
                "mimeType": "application/vnd.google-apps.folder",
                "parents": ["parent-1"]
            })))
            .with_status(200)
            .with_body(r#"{"id":"folder-9"}"#)
            .create_async()
            .await;

        let id = client(server.url())
            .await
            .create_folder("Jane_Main St_W1", &parent())
            .await
            .unwrap();

        assert_eq!(id.as_str(), "folder-9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_file_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/drive/v3/files")
            .match_query(Matcher::UrlEncoded("uploadType".into(), "multipart".into()))
            .match_header("content-type", Matcher::Regex("^multipart/related; boundary=ferry-".into()))
            .match_body(Matcher::Regex(r#""name":"front_f1.jpg""#.into()))
            .with_status(200)
            .with_body(r#"{"id":"file-1"}"#)
            .create_async()
            .await;

        let id = client(server.url())
            .await
            .create_file("front_f1.jpg", &parent(), b"jpeg-bytes".to_vec(), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(id, "file-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_recovers_once() {
        let mut server = mockito::Server::new_async().await;
        let rejected = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ya29.token-1")
            .with_status(401)
            .create_async()
            .await;
        let accepted = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ya29.token-2")
            .with_status(200)
            .with_body(r#"{"id":"folder-2"}"#)
            .create_async()
            .await;

        let id = client(server.url())
            .await
            .create_folder("X", &parent())
            .await
            .unwrap();

        assert_eq!(id.as_str(), "folder-2");
        rejected.assert_async().await;
        accepted.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_mapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("rate limit exceeded")
            .create_async()
            .await;

        let result = client(server.url())
            .await
            .create_folder("X", &parent())
            .await;

        assert!(matches!(
            result,
            Err(DestinationError::Http { status: 403, ref message }) if message.contains("rate limit")
        ));
    }

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related("b", br#"{"name":"x"}"#, "image/jpeg", b"DATA");
        let text = String::from_utf8(body).unwrap();
        assert_eq!(
            text,
            "--b\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"x\"}\r\n\
             --b\r\nContent-Type: image/jpeg\r\n\r\nDATA\r\n--b--\r\n"
        );
    }
}
