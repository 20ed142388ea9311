//! Configuration schema types
//!
//! This module defines the configuration structure for Ferry.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Nominal lifetime of a source access token in seconds
///
/// Background renewal must fire before this elapses.
pub const NOMINAL_TOKEN_LIFETIME_SECS: u64 = 3600;

/// How the source access token is kept fresh during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Refresh inline: at startup, on 401, and every `batch_size` transfers
    #[default]
    Synchronous,
    /// A background task replaces the token on a fixed cadence
    Background,
}

impl std::str::FromStr for CredentialMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synchronous" | "sync" => Ok(Self::Synchronous),
            "background" => Ok(Self::Background),
            _ => Err(format!(
                "Invalid credential mode '{s}'. Must be one of: synchronous, background"
            )),
        }
    }
}

impl std::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synchronous => write!(f, "synchronous"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// When the checkpoint cursor is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// After every record
    #[default]
    EveryRecord,
    /// Every `batch_size` successful transfers, and at the end of the run
    BatchBoundary,
}

impl std::str::FromStr for CheckpointPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "every_record" => Ok(Self::EveryRecord),
            "batch_boundary" => Ok(Self::BatchBoundary),
            _ => Err(format!(
                "Invalid checkpoint policy '{s}'. Must be one of: every_record, batch_boundary"
            )),
        }
    }
}

impl std::fmt::Display for CheckpointPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EveryRecord => write!(f, "every_record"),
            Self::BatchBoundary => write!(f, "batch_boundary"),
        }
    }
}

/// Main Ferry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FerryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Zoho CRM source configuration
    pub source: SourceConfig,

    /// Google Drive destination configuration
    pub destination: DestinationConfig,

    /// Record input configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Transfer pacing and credential settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Persisted state locations
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FerryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.destination.validate()?;
        self.input.validate()?;
        self.transfer.validate()?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Zoho CRM source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API domain, e.g. `https://www.zohoapis.com`
    #[serde(default = "default_zoho_api_domain")]
    pub api_domain: String,

    /// OAuth token endpoint
    #[serde(default = "default_zoho_token_url")]
    pub token_url: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,

    /// Long-lived refresh token
    /// Stored securely in memory and automatically zeroized on drop
    pub refresh_token: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_url("source.api_domain", &self.api_domain)?;
        validate_url("source.token_url", &self.token_url)?;

        if self.client_id.is_empty() {
            return Err("source.client_id cannot be empty".to_string());
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err("source.client_secret cannot be empty".to_string());
        }
        if self.refresh_token.expose_secret().is_empty() {
            return Err("source.refresh_token cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("source.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Google Drive destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Path to the authorized-user credentials JSON file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,

    /// Folder under which per-record folders are created
    pub parent_folder_id: String,

    /// Drive API base URL
    #[serde(default = "default_drive_api_base_url")]
    pub api_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_upload_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.credentials_file.is_empty() {
            return Err("destination.credentials_file cannot be empty".to_string());
        }
        if self.parent_folder_id.trim().is_empty() {
            return Err("destination.parent_folder_id cannot be empty".to_string());
        }
        validate_url("destination.api_base_url", &self.api_base_url)?;
        if self.timeout_seconds == 0 {
            return Err("destination.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Record input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the CSV export
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Column holding the source file id
    #[serde(default = "default_file_id_column")]
    pub file_id_column: String,

    /// Columns joined (in order) into the destination folder name
    #[serde(default = "default_grouping_columns")]
    pub grouping_columns: Vec<String>,

    /// Column used as the file name prefix
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.csv_path.is_empty() {
            return Err("input.csv_path cannot be empty".to_string());
        }
        if self.file_id_column.is_empty() {
            return Err("input.file_id_column cannot be empty".to_string());
        }
        if self.grouping_columns.is_empty() {
            return Err("input.grouping_columns cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            file_id_column: default_file_id_column(),
            grouping_columns: default_grouping_columns(),
            label_column: default_label_column(),
        }
    }
}

/// Transfer pacing and credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Credential renewal mode
    #[serde(default)]
    pub credential_mode: CredentialMode,

    /// Successful transfers per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches per run (unset = run until end of input)
    #[serde(default)]
    pub batches_per_run: Option<usize>,

    /// Checkpoint write policy
    #[serde(default)]
    pub checkpoint_policy: CheckpointPolicy,

    /// Delay after each successful upload in milliseconds
    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,

    /// Delay after each folder creation in milliseconds
    #[serde(default = "default_folder_settle_delay_ms")]
    pub folder_settle_delay_ms: u64,

    /// Background renewal cadence in seconds
    #[serde(default = "default_renewal_interval_seconds")]
    pub renewal_interval_seconds: u64,

    /// Pause between failed background renewal attempts in milliseconds
    #[serde(default = "default_renewal_retry_backoff_ms")]
    pub renewal_retry_backoff_ms: u64,
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("transfer.batch_size must be > 0".to_string());
        }
        if self.batches_per_run == Some(0) {
            return Err("transfer.batches_per_run must be > 0 when set".to_string());
        }
        if self.renewal_interval_seconds == 0
            || self.renewal_interval_seconds >= NOMINAL_TOKEN_LIFETIME_SECS
        {
            return Err(format!(
                "transfer.renewal_interval_seconds must be between 1 and {}, got {}",
                NOMINAL_TOKEN_LIFETIME_SECS - 1,
                self.renewal_interval_seconds
            ));
        }
        if self.renewal_retry_backoff_ms == 0 {
            return Err("transfer.renewal_retry_backoff_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            credential_mode: CredentialMode::default(),
            batch_size: default_batch_size(),
            batches_per_run: None,
            checkpoint_policy: CheckpointPolicy::default(),
            upload_delay_ms: default_upload_delay_ms(),
            folder_settle_delay_ms: default_folder_settle_delay_ms(),
            renewal_interval_seconds: default_renewal_interval_seconds(),
            renewal_retry_backoff_ms: default_renewal_retry_backoff_ms(),
        }
    }
}

/// Persisted state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Checkpoint cursor file
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,

    /// Transferred-id ledger file
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.checkpoint_path.is_empty() {
            return Err("state.checkpoint_path cannot be empty".to_string());
        }
        if self.ledger_path.is_empty() {
            return Err("state.ledger_path cannot be empty".to_string());
        }
        if self.checkpoint_path == self.ledger_path {
            return Err("state.checkpoint_path and state.ledger_path must differ".to_string());
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: default_checkpoint_path(),
            ledger_path: default_ledger_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_zoho_api_domain() -> String {
    "https://www.zohoapis.com".to_string()
}

fn default_zoho_token_url() -> String {
    "https://accounts.zoho.com/oauth/v2/token".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_upload_timeout_seconds() -> u64 {
    300
}

fn default_credentials_file() -> String {
    "/etc/secrets/Google_Key.json".to_string()
}

fn default_drive_api_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_csv_path() -> String {
    "updated.csv".to_string()
}

fn default_file_id_column() -> String {
    "File_Id__s".to_string()
}

fn default_grouping_columns() -> Vec<String> {
    vec![
        "Full_Name".to_string(),
        "Mailing_Street".to_string(),
        "Well_Id".to_string(),
    ]
}

fn default_label_column() -> String {
    "Image Field".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_upload_delay_ms() -> u64 {
    1000
}

fn default_folder_settle_delay_ms() -> u64 {
    2000
}

fn default_renewal_interval_seconds() -> u64 {
    2400
}

fn default_renewal_retry_backoff_ms() -> u64 {
    30_000
}

fn default_checkpoint_path() -> String {
    "progress.txt".to_string()
}

fn default_ledger_path() -> String {
    "uploaded_files.json".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn create_test_config() -> FerryConfig {
        FerryConfig {
            application: ApplicationConfig::default(),
            source: SourceConfig {
                api_domain: default_zoho_api_domain(),
                token_url: default_zoho_token_url(),
                client_id: "1000.CLIENT".to_string(),
                client_secret: secret_string("secret".to_string()),
                refresh_token: secret_string("1000.refresh".to_string()),
                timeout_seconds: 60,
            },
            destination: DestinationConfig {
                credentials_file: "google.json".to_string(),
                parent_folder_id: "parent-1".to_string(),
                api_base_url: default_drive_api_base_url(),
                timeout_seconds: 300,
            },
            input: InputConfig::default(),
            transfer: TransferConfig::default(),
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(create_test_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_test_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_refresh_token() {
        let mut config = create_test_config();
        config.source.refresh_token = secret_string(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.contains("refresh_token"));
    }

    #[test]
    fn test_invalid_api_domain() {
        let mut config = create_test_config();
        config.source.api_domain = "ftp://zoho".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_parent_folder() {
        let mut config = create_test_config();
        config.destination.parent_folder_id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = create_test_config();
        config.transfer.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batches_per_run() {
        let mut config = create_test_config();
        config.transfer.batches_per_run = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_renewal_interval_must_be_shorter_than_token_lifetime() {
        let mut config = create_test_config();
        config.transfer.renewal_interval_seconds = NOMINAL_TOKEN_LIFETIME_SECS;
        assert!(config.validate().is_err());

        config.transfer.renewal_interval_seconds = 2400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_state_paths_must_differ() {
        let mut config = create_test_config();
        config.state.ledger_path = config.state.checkpoint_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_grouping_columns() {
        let mut config = create_test_config();
        config.input.grouping_columns.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transfer_defaults() {
        let transfer = TransferConfig::default();
        assert_eq!(transfer.credential_mode, CredentialMode::Synchronous);
        assert_eq!(transfer.checkpoint_policy, CheckpointPolicy::EveryRecord);
        assert_eq!(transfer.batch_size, 50);
        assert!(transfer.batches_per_run.is_none());
        assert_eq!(transfer.upload_delay_ms, 1000);
        assert_eq!(transfer.folder_settle_delay_ms, 2000);
        assert_eq!(transfer.renewal_interval_seconds, 2400);
    }

    #[test]
    fn test_credential_mode_from_str() {
        use std::str::FromStr;
        assert_eq!(
            CredentialMode::from_str("background").unwrap(),
            CredentialMode::Background
        );
        assert_eq!(
            CredentialMode::from_str("SYNC").unwrap(),
            CredentialMode::Synchronous
        );
        assert!(CredentialMode::from_str("threaded").is_err());
    }

    #[test]
    fn test_checkpoint_policy_deserialization() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: CheckpointPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"batch_boundary\"").unwrap();
        assert_eq!(w.policy, CheckpointPolicy::BatchBoundary);
    }
}
