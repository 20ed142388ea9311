//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Ferry configuration file.

use crate::config::load_config;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Zoho API: {}", config.source.api_domain);
        println!("  Zoho Token URL: {}", config.source.token_url);
        println!("  Drive API: {}", config.destination.api_base_url);
        println!("  Parent Folder: {}", config.destination.parent_folder_id);
        println!("  Credentials File: {}", config.destination.credentials_file);
        if !Path::new(&config.destination.credentials_file).exists() {
            println!("    (warning: file not found)");
        }
        println!("  Input: {}", config.input.csv_path);
        println!("  Folder Columns: {:?}", config.input.grouping_columns);
        println!("  Credential Mode: {}", config.transfer.credential_mode);
        println!("  Checkpoint Policy: {}", config.transfer.checkpoint_policy);
        println!("  Batch Size: {}", config.transfer.batch_size);
        match config.transfer.batches_per_run {
            Some(n) => println!("  Batches Per Run: {n}"),
            None => println!("  Batches Per Run: until end of input"),
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/ferry.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[source]
client_id = "id"
client_secret = "secret"
refresh_token = "refresh"

[destination]
parent_folder_id = "parent"
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
