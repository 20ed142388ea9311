//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "ferry.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("Initializing Ferry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your Zoho credentials:");
                println!("     - ZOHO_CLIENT_ID, ZOHO_CLIENT_SECRET, ZOHO_REFRESH_TOKEN");
                println!("  3. Point destination.credentials_file at your Google authorized-user JSON");
                println!("  4. Validate configuration: ferry validate-config");
                println!("  5. Run transfer: ferry transfer");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Ferry Configuration File
# Zoho CRM to Google Drive transfer tool

[application]
log_level = "info"

[source]
client_id = "${ZOHO_CLIENT_ID}"
client_secret = "${ZOHO_CLIENT_SECRET}"
refresh_token = "${ZOHO_REFRESH_TOKEN}"

[destination]
credentials_file = "/etc/secrets/Google_Key.json"
parent_folder_id = "your-parent-folder-id"

[input]
csv_path = "updated.csv"

[transfer]
credential_mode = "synchronous"
batch_size = 50

[state]
checkpoint_path = "progress.txt"
ledger_path = "uploaded_files.json"

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Ferry Configuration File
# Zoho CRM to Google Drive transfer tool
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any key can also be overridden with FERRY_<SECTION>_<KEY>, for example
# FERRY_TRANSFER_BATCH_SIZE=25.

[application]
# trace | debug | info | warn | error
log_level = "info"

[source]
# Zoho API domain for your data center (.com, .eu, .in, ...)
api_domain = "https://www.zohoapis.com"
token_url = "https://accounts.zoho.com/oauth/v2/token"
client_id = "${ZOHO_CLIENT_ID}"
client_secret = "${ZOHO_CLIENT_SECRET}"
refresh_token = "${ZOHO_REFRESH_TOKEN}"
timeout_seconds = 60

[destination]
# Google authorized-user credentials (client_id, client_secret, refresh_token)
credentials_file = "/etc/secrets/Google_Key.json"
# Folder under which one folder per record group is created
parent_folder_id = "your-parent-folder-id"
api_base_url = "https://www.googleapis.com"
timeout_seconds = 300

[input]
csv_path = "updated.csv"
# Column holding the Zoho file id
file_id_column = "File_Id__s"
# Columns joined with "_" into the destination folder name
grouping_columns = ["Full_Name", "Mailing_Street", "Well_Id"]
# Column used as the uploaded file name prefix
label_column = "Image Field"

[transfer]
# synchronous: refresh at startup, on 401, and after every batch
# background:  a background task refreshes every renewal_interval_seconds
credential_mode = "synchronous"
# Successful uploads per batch
batch_size = 50
# Stop after this many batches (remove to run until the end of the input)
# batches_per_run = 10
# every_record | batch_boundary
checkpoint_policy = "every_record"
upload_delay_ms = 1000
folder_settle_delay_ms = 2000
# Must be shorter than the one hour token lifetime
renewal_interval_seconds = 2400
renewal_retry_backoff_ms = 30000

[state]
# Resume index
checkpoint_path = "progress.txt"
# Ids of files already uploaded
ledger_path = "uploaded_files.json"

[logging]
local_enabled = true
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FerryConfig;

    fn parse_template(template: &str) -> FerryConfig {
        let filled = template
            .replace("${ZOHO_CLIENT_ID}", "id")
            .replace("${ZOHO_CLIENT_SECRET}", "secret")
            .replace("${ZOHO_REFRESH_TOKEN}", "refresh");
        let config: FerryConfig = toml::from_str(&filled).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "ferry.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "ferry.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_minimal_config_is_valid() {
        let config = parse_template(&InitArgs::generate_minimal_config());
        assert_eq!(config.transfer.batch_size, 50);
        assert_eq!(config.state.ledger_path, "uploaded_files.json");
    }

    #[test]
    fn test_config_with_examples_is_valid() {
        let config = parse_template(&InitArgs::generate_config_with_examples());
        assert_eq!(config.input.grouping_columns.len(), 3);
        assert_eq!(config.transfer.batches_per_run, None);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferry.toml");
        fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }
}
