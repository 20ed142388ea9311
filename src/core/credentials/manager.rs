//! Credential manager
//!
//! Holds the current access token for one remote and replaces it on refresh.
//! Readers never block on a refresh in progress: they see the previous token
//! until the new one is published.

use super::token::{AccessToken, TokenEndpoint};
use crate::domain::AuthError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Publishes access tokens for one remote
pub struct CredentialManager {
    /// Name used in log lines ("zoho", "drive")
    name: String,

    endpoint: Arc<dyn TokenEndpoint>,

    /// Latest published token
    current: watch::Sender<Option<Arc<AccessToken>>>,

    /// Serializes refreshes; the holder is the only writer
    refresh_lock: Mutex<()>,

    /// Highest generation rejected by a remote (0 = none)
    rejected_generation: AtomicU64,
}

impl CredentialManager {
    /// Create a manager with no token yet
    pub fn new(name: impl Into<String>, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            name: name.into(),
            endpoint,
            current,
            refresh_lock: Mutex::new(()),
            rejected_generation: AtomicU64::new(0),
        }
    }

    /// Name of the remote this manager serves
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The latest published token
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoUsableCredential`] if no token was ever obtained.
    pub fn current_token(&self) -> Result<Arc<AccessToken>, AuthError> {
        self.current.borrow().clone().ok_or_else(|| {
            AuthError::NoUsableCredential(format!("no {} access token has been obtained", self.name))
        })
    }

    /// Generation of the latest published token (0 before the first refresh)
    pub fn generation(&self) -> u64 {
        self.current
            .borrow()
            .as_ref()
            .map_or(0, |token| token.generation)
    }

    /// Subscribe to token replacements
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<AccessToken>>> {
        self.current.subscribe()
    }

    /// Obtain and publish a new token
    ///
    /// On failure the previous token stays published.
    ///
    /// # Errors
    ///
    /// - [`AuthError::RefreshFailed`] when the endpoint fails but a usable
    ///   token is still published
    /// - [`AuthError::NoUsableCredential`] when the endpoint fails and there is
    ///   no token, or the published one has been rejected
    pub async fn refresh(&self) -> Result<Arc<AccessToken>, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Handle a 401 for `rejected`
    ///
    /// Marks that generation unusable. If a newer token has already been
    /// published it is returned without contacting the endpoint; otherwise a
    /// refresh is performed.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialManager::refresh`]. A failed refresh here always
    /// yields [`AuthError::NoUsableCredential`] because the published token
    /// is known to be bad.
    pub async fn recover_from_unauthorized(
        &self,
        rejected: &AccessToken,
    ) -> Result<Arc<AccessToken>, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        self.rejected_generation
            .fetch_max(rejected.generation, Ordering::SeqCst);

        let published = self.current.borrow().clone();
        if let Some(token) = published {
            if token.generation > rejected.generation {
                tracing::debug!(
                    remote = %self.name,
                    rejected_generation = rejected.generation,
                    generation = token.generation,
                    "Newer token already published after 401"
                );
                return Ok(token);
            }
        }

        tracing::warn!(
            remote = %self.name,
            rejected_generation = rejected.generation,
            "Access token rejected, refreshing"
        );
        self.refresh_locked().await
    }

    /// Start the background renewal task
    ///
    /// Sleeps `interval`, refreshes, and repeats. A failed refresh is retried
    /// every `retry_backoff` until it succeeds. The task runs until the
    /// returned handle is aborted.
    pub fn spawn_renewal(
        self: &Arc<Self>,
        interval: Duration,
        retry_backoff: Duration,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tracing::info!(
            remote = %manager.name,
            interval_secs = interval.as_secs(),
            "Starting background token renewal"
        );

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let mut attempt: u32 = 0;
                loop {
                    attempt += 1;
                    match manager.refresh().await {
                        Ok(token) => {
                            tracing::debug!(
                                remote = %manager.name,
                                generation = token.generation,
                                "Background renewal succeeded"
                            );
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(
                                remote = %manager.name,
                                attempt = attempt,
                                retry_in_ms = retry_backoff.as_millis() as u64,
                                error = %e,
                                "Background renewal failed, retrying"
                            );
                            tokio::time::sleep(retry_backoff).await;
                        }
                    }
                }
            }
        })
    }

    async fn refresh_locked(&self) -> Result<Arc<AccessToken>, AuthError> {
        match self.endpoint.request_token().await {
            Ok(grant) => {
                let generation = self.generation() + 1;
                let token = Arc::new(AccessToken::from_grant(grant, generation));
                self.current.send_replace(Some(Arc::clone(&token)));

                tracing::info!(
                    remote = %self.name,
                    generation = generation,
                    expires_at = ?token.expires_at,
                    "Access token refreshed"
                );
                Ok(token)
            }
            Err(e) => {
                let message = e.to_string();
                if self.has_usable_token() {
                    tracing::warn!(
                        remote = %self.name,
                        error = %message,
                        "Token refresh failed, keeping previous token"
                    );
                    Err(AuthError::RefreshFailed(message))
                } else {
                    tracing::error!(
                        remote = %self.name,
                        error = %message,
                        "Token refresh failed and no usable token remains"
                    );
                    Err(AuthError::NoUsableCredential(message))
                }
            }
        }
    }

    fn has_usable_token(&self) -> bool {
        let generation = self.generation();
        generation > 0 && generation > self.rejected_generation.load(Ordering::SeqCst)
    }
}
