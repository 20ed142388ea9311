//! Access token types and the token endpoint seam

use crate::config::{secret_string, SecretString};
use crate::domain::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

/// A token as returned by a token endpoint
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// The bearer value
    pub access_token: SecretString,

    /// Lifetime in seconds, when the endpoint reports one
    pub expires_in: Option<u64>,
}

impl TokenGrant {
    /// Create a grant from a raw token value
    pub fn new(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token: secret_string(access_token.into()),
            expires_in,
        }
    }
}

/// A published access token
///
/// Tokens are immutable; a refresh publishes a new one with a higher
/// generation.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: SecretString,

    /// Monotonic counter, starting at 1 for the first token
    pub generation: u64,

    /// When the token was obtained
    pub issued_at: DateTime<Utc>,

    /// When the endpoint says the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub(crate) fn from_grant(grant: TokenGrant, generation: u64) -> Self {
        let issued_at = Utc::now();
        let expires_at = grant.expires_in.and_then(|secs| expiry_after(issued_at, secs));
        Self {
            value: grant.access_token,
            generation,
            issued_at,
            expires_at,
        }
    }

    /// The raw token value for an Authorization header
    pub fn secret(&self) -> &str {
        self.value.expose_secret().as_ref()
    }

    /// Whether the reported expiry has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// `issued_at + secs`, or `None` when the sum does not fit a timestamp
fn expiry_after(issued_at: DateTime<Utc>, secs: u64) -> Option<DateTime<Utc>> {
    let lifetime = chrono::Duration::try_seconds(i64::try_from(secs).ok()?)?;
    issued_at.checked_add_signed(lifetime)
}

/// Obtains fresh access tokens from an authority
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Exchange the long-lived credential for a new access token
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RefreshFailed`] when the authority rejects the
    /// request or cannot be reached.
    async fn request_token(&self) -> Result<TokenGrant, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_expiry() {
        let token = AccessToken::from_grant(TokenGrant::new("abc", Some(3600)), 1);
        assert_eq!(token.secret(), "abc");
        assert_eq!(token.generation, 1);
        assert!(!token.is_expired());

        let expired = AccessToken::from_grant(TokenGrant::new("abc", Some(0)), 2);
        assert!(expired.is_expired());
    }

    #[test]
    fn test_access_token_without_expiry_never_expires() {
        let token = AccessToken::from_grant(TokenGrant::new("abc", None), 1);
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_unrepresentable_lifetime_is_treated_as_no_expiry() {
        let token = AccessToken::from_grant(TokenGrant::new("abc", Some(u64::MAX)), 1);
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());

        let token = AccessToken::from_grant(TokenGrant::new("abc", Some(i64::MAX as u64)), 2);
        assert!(token.expires_at.is_none());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::from_grant(TokenGrant::new("1000.secret", None), 1);
        assert!(!format!("{token:?}").contains("1000.secret"));
    }
}
