//! Configuration management for Ferry.
//!
//! Ferry reads a TOML file with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FERRY_<SECTION>_<KEY>` environment overrides
//! - Default values for everything except credentials and the parent folder
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! client_id = "1000.XXXXXXXX"
//! client_secret = "${ZOHO_CLIENT_SECRET}"
//! refresh_token = "${ZOHO_REFRESH_TOKEN}"
//!
//! [destination]
//! credentials_file = "/etc/secrets/Google_Key.json"
//! parent_folder_id = "1VeR-E_NVIGFvYi68U"
//!
//! [transfer]
//! credential_mode = "background"
//! batch_size = 50
//! ```
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//! println!("Uploading under folder {}", config.destination.parent_folder_id);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CheckpointPolicy, CredentialMode, DestinationConfig, FerryConfig,
    InputConfig, LoggingConfig, SourceConfig, StateConfig, TransferConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
