//! Domain error types
//!
//! This module defines the error hierarchy for Ferry.
//! Adapter errors never expose third-party HTTP client types.

use thiserror::Error;

/// Main Ferry error type
///
/// This is the primary error type used throughout the application.
/// Record-level failures are reported through [`crate::core::transfer::RecordOutcome`];
/// a `FerryError` that escapes the transfer loop is a run-level error.
#[derive(Debug, Error)]
pub enum FerryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential errors (token refresh, credential files)
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Source API (Zoho CRM) errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Destination API (Google Drive) errors
    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    /// Local ledger or checkpoint could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Record input could not be read
    #[error("Input error: {0}")]
    Input(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FerryError {
    /// Whether this error must stop the run
    ///
    /// Persistence failures risk duplicate delivery on resume, and a lost
    /// credential would fail every remaining record.
    pub fn is_fatal(&self) -> bool {
        match self {
            FerryError::Persistence(_) | FerryError::Auth(AuthError::NoUsableCredential(_)) => {
                true
            }
            FerryError::Destination(e) => e.is_credential_loss(),
            _ => false,
        }
    }
}

/// Credential errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint rejected the refresh or could not be reached.
    /// The previously published token is still in place.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// No token was ever obtained, or every known token has been rejected
    #[error("No usable credential: {0}")]
    NoUsableCredential(String),

    /// A credential file is missing or malformed
    #[error("Invalid credential file: {0}")]
    InvalidCredentialFile(String),
}

/// Source API errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The access token was rejected (401)
    #[error("Unauthorized: access token rejected")]
    Unauthorized,

    /// Any other non-success HTTP status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network/connection failure
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Destination API errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DestinationError {
    /// The access token was rejected (401)
    #[error("Unauthorized: access token rejected")]
    Unauthorized,

    /// Any other non-success HTTP status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network/connection failure
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The destination token could not be renewed after a 401
    #[error("Credential error: {0}")]
    Credential(AuthError),
}

impl DestinationError {
    /// Whether the destination has no usable credential left
    pub fn is_credential_loss(&self) -> bool {
        matches!(
            self,
            DestinationError::Credential(AuthError::NoUsableCredential(_))
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FerryError {
    fn from(err: serde_json::Error) -> Self {
        FerryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FerryError {
    fn from(err: toml::de::Error) -> Self {
        FerryError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ferry_error_display() {
        let err = FerryError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: FerryError = AuthError::RefreshFailed("HTTP 400".to_string()).into();
        assert!(matches!(err, FerryError::Auth(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_no_usable_credential_is_fatal() {
        let err: FerryError = AuthError::NoUsableCredential("expired".to_string()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_persistence_is_fatal() {
        let err = FerryError::Persistence("disk full".to_string());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_remote_errors_are_not_fatal() {
        let source: FerryError = SourceError::Http {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        let dest: FerryError = DestinationError::Connection("reset".to_string()).into();
        assert!(!source.is_fatal());
        assert!(!dest.is_fatal());
    }

    #[test]
    fn test_destination_credential_loss_is_fatal() {
        let err: FerryError = DestinationError::Credential(AuthError::NoUsableCredential(
            "refresh rejected".to_string(),
        ))
        .into();
        assert!(err.is_fatal());

        let transient: FerryError =
            DestinationError::Credential(AuthError::RefreshFailed("timeout".to_string())).into();
        assert!(!transient.is_fatal());
    }

    #[test]
    fn test_source_http_error_display() {
        let err = SourceError::Http {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error: 404 - not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: FerryError = io_err.into();
        assert!(matches!(err, FerryError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FerryError = json_err.into();
        assert!(matches!(err, FerryError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: FerryError = toml_err.into();
        assert!(matches!(err, FerryError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
