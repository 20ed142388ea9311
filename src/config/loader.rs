//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FerryConfig;
use super::secret_string;
use crate::domain::errors::FerryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FerryConfig
/// 4. Applies environment variable overrides (FERRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ferry::config::loader::load_config;
///
/// let config = load_config("ferry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FerryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FerryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FerryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Runs the same substitution, override and validation steps as [`load_config`].
pub fn parse_config(contents: &str) -> Result<FerryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FerryConfig = toml::from_str(&contents)
        .map_err(|e| FerryError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FerryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are passed through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FerryError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FerryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.parse().map(Some).map_err(|_| {
            FerryError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using FERRY_* prefix
///
/// Environment variables follow the pattern: FERRY_<SECTION>_<KEY>
/// For example: FERRY_TRANSFER_BATCH_SIZE, FERRY_SOURCE_REFRESH_TOKEN
fn apply_env_overrides(config: &mut FerryConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FERRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("FERRY_SOURCE_API_DOMAIN") {
        config.source.api_domain = val;
    }
    if let Ok(val) = std::env::var("FERRY_SOURCE_TOKEN_URL") {
        config.source.token_url = val;
    }
    if let Ok(val) = std::env::var("FERRY_SOURCE_CLIENT_ID") {
        config.source.client_id = val;
    }
    if let Ok(val) = std::env::var("FERRY_SOURCE_CLIENT_SECRET") {
        config.source.client_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("FERRY_SOURCE_REFRESH_TOKEN") {
        config.source.refresh_token = secret_string(val);
    }

    // Destination overrides
    if let Ok(val) = std::env::var("FERRY_DESTINATION_CREDENTIALS_FILE") {
        config.destination.credentials_file = val;
    }
    if let Ok(val) = std::env::var("FERRY_DESTINATION_PARENT_FOLDER_ID") {
        config.destination.parent_folder_id = val;
    }

    // Input overrides
    if let Ok(val) = std::env::var("FERRY_INPUT_CSV_PATH") {
        config.input.csv_path = val;
    }

    // Transfer overrides
    if let Some(mode) = parse_env("FERRY_TRANSFER_CREDENTIAL_MODE")? {
        config.transfer.credential_mode = mode;
    }
    if let Some(size) = parse_env("FERRY_TRANSFER_BATCH_SIZE")? {
        config.transfer.batch_size = size;
    }
    if let Some(batches) = parse_env("FERRY_TRANSFER_BATCHES_PER_RUN")? {
        config.transfer.batches_per_run = Some(batches);
    }
    if let Some(policy) = parse_env("FERRY_TRANSFER_CHECKPOINT_POLICY")? {
        config.transfer.checkpoint_policy = policy;
    }
    if let Some(delay) = parse_env("FERRY_TRANSFER_UPLOAD_DELAY_MS")? {
        config.transfer.upload_delay_ms = delay;
    }
    if let Some(delay) = parse_env("FERRY_TRANSFER_FOLDER_SETTLE_DELAY_MS")? {
        config.transfer.folder_settle_delay_ms = delay;
    }

    // State overrides
    if let Ok(val) = std::env::var("FERRY_STATE_CHECKPOINT_PATH") {
        config.state.checkpoint_path = val;
    }
    if let Ok(val) = std::env::var("FERRY_STATE_LEDGER_PATH") {
        config.state.ledger_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
