//! Transfer command implementation
//!
//! This module implements the `transfer` command, which moves Zoho CRM
//! files into Google Drive folders.

use crate::config::{load_config, CredentialMode, FerryConfig};
use crate::core::transfer::{TransferCoordinator, TransferSummary};
use crate::domain::FerryError;
use clap::Args;
use tokio::sync::watch;

/// Maximum number of record errors printed in the summary
const MAX_PRINTED_ERRORS: usize = 10;

/// Arguments for the transfer command
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override credential renewal mode (synchronous or background)
    #[arg(long, value_name = "MODE")]
    pub credential_mode: Option<CredentialMode>,

    /// Cover N x batch_size input rows this run, counting skipped and failed rows
    #[arg(long, value_name = "N", conflicts_with = "until_end")]
    pub batches: Option<usize>,

    /// Run until the end of the input, ignoring batches_per_run
    #[arg(long)]
    pub until_end: bool,
}

impl TransferArgs {
    /// Apply CLI overrides to the loaded configuration
    fn apply_overrides(&self, config: &mut FerryConfig) {
        if let Some(mode) = self.credential_mode {
            tracing::info!(mode = %mode, "Overriding credential mode from CLI");
            config.transfer.credential_mode = mode;
        }

        if let Some(batches) = self.batches {
            tracing::info!(batches = batches, "Overriding batches per run from CLI");
            config.transfer.batches_per_run = Some(batches);
        }

        if self.until_end {
            tracing::info!("Running until end of input");
            config.transfer.batches_per_run = None;
        }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting transfer command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if !self.yes {
            println!("Transfer Configuration:");
            println!("  Input: {}", config.input.csv_path);
            println!("  Parent folder: {}", config.destination.parent_folder_id);
            println!("  Credential mode: {}", config.transfer.credential_mode);
            println!("  Batch size: {}", config.transfer.batch_size);
            println!(
                "  Batches: {}",
                config
                    .transfer
                    .batches_per_run
                    .map_or_else(|| "until end of input".to_string(), |n| n.to_string())
            );
            println!();
            print!("Proceed with transfer? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Transfer cancelled.");
                return Ok(0);
            }
        }

        let prepared = match TransferCoordinator::from_config(&config, shutdown_signal) {
            Ok(coordinator) => coordinator.prepare().await,
            Err(e) => Err(e),
        };
        let prepared = match prepared {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start transfer");
                eprintln!("Failed to start transfer: {e}");
                return Ok(startup_exit_code(&e));
            }
        };

        println!(
            "Starting transfer at record {} of {}...",
            prepared.start_index(),
            prepared.total_records()
        );
        println!();

        let summary = match prepared.run().await {
            Ok(s) => s,
            Err(e) => {
                crate::log_error_with_context!(e, "Transfer aborted");
                eprintln!("Transfer aborted: {e}");
                eprintln!("Progress up to the last recorded file is saved.");
                return Ok(5);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

/// Exit code for a failure before the first record
fn startup_exit_code(error: &FerryError) -> i32 {
    match error {
        FerryError::Configuration(_) => 2,
        FerryError::Persistence(_) => 5,
        _ => 4,
    }
}

/// Exit code for a finished run
///
/// Record failures do not change the code; they are retried next run.
fn exit_code(summary: &TransferSummary) -> i32 {
    if summary.credential_halt {
        5
    } else if summary.interrupted {
        130
    } else {
        0
    }
}

fn print_summary(summary: &TransferSummary) {
    println!();
    println!("Transfer Summary:");
    println!("  Records in input: {}", summary.total_records);
    println!("  Started at index: {}", summary.start_index);
    println!("  Processed: {}", summary.attempted);
    println!("  Transferred: {}", summary.recorded);
    println!("  Skipped (no file id): {}", summary.skipped_empty);
    println!("  Skipped (already transferred): {}", summary.skipped_duplicate);
    println!("  Failed: {}", summary.failed);
    println!("  Folders created: {}", summary.folders_created);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("Records not transferred:");
        for error in summary.errors.iter().take(MAX_PRINTED_ERRORS) {
            println!(
                "  - #{} {} [{}]: {}",
                error.index, error.source_file_id, error.stage, error.message
            );
        }
        if summary.errors.len() > MAX_PRINTED_ERRORS {
            println!(
                "  ... and {} more",
                summary.errors.len() - MAX_PRINTED_ERRORS
            );
        }
        println!();
    }

    if summary.checkpoint_cleared {
        println!("Processing complete.");
    } else if summary.credential_halt {
        println!(
            "Transfer stopped: the source token could not be refreshed. Progress saved at index {}.",
            summary.next_index
        );
        println!("Check the Zoho credentials and run the same command to resume.");
    } else if summary.interrupted {
        println!("Transfer interrupted. Progress saved at index {}.", summary.next_index);
        println!("Run the same command to resume.");
    } else {
        println!(
            "Processing stopped at index {}. {} records remaining.",
            summary.next_index,
            summary.remaining()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::domain::AuthError;

    fn config() -> FerryConfig {
        parse_config(
            r#"
[source]
client_id = "id"
client_secret = "secret"
refresh_token = "refresh"

[destination]
parent_folder_id = "parent"

[transfer]
batches_per_run = 4
"#,
        )
        .unwrap()
    }

    fn args() -> TransferArgs {
        TransferArgs {
            yes: true,
            credential_mode: None,
            batches: None,
            until_end: false,
        }
    }

    #[test]
    fn test_overrides_leave_config_untouched_by_default() {
        let mut config = config();
        args().apply_overrides(&mut config);
        assert_eq!(config.transfer.batches_per_run, Some(4));
        assert_eq!(config.transfer.credential_mode, CredentialMode::Synchronous);
    }

    #[test]
    fn test_until_end_clears_batch_limit() {
        let mut config = config();
        TransferArgs {
            until_end: true,
            ..args()
        }
        .apply_overrides(&mut config);
        assert_eq!(config.transfer.batches_per_run, None);
    }

    #[test]
    fn test_batches_and_mode_override() {
        let mut config = config();
        TransferArgs {
            batches: Some(1),
            credential_mode: Some(CredentialMode::Background),
            ..args()
        }
        .apply_overrides(&mut config);
        assert_eq!(config.transfer.batches_per_run, Some(1));
        assert_eq!(config.transfer.credential_mode, CredentialMode::Background);
    }

    #[test]
    fn test_startup_exit_codes() {
        assert_eq!(
            startup_exit_code(&FerryError::Configuration("x".to_string())),
            2
        );
        assert_eq!(
            startup_exit_code(&FerryError::Persistence("x".to_string())),
            5
        );
        assert_eq!(
            startup_exit_code(&AuthError::NoUsableCredential("x".to_string()).into()),
            4
        );
        assert_eq!(startup_exit_code(&FerryError::Input("x".to_string())), 4);
    }

    #[test]
    fn test_run_exit_codes() {
        let mut summary = TransferSummary::new(3, 0);
        summary.failed = 2;
        assert_eq!(exit_code(&summary), 0);
        summary.interrupted = true;
        assert_eq!(exit_code(&summary), 130);
    }

    #[test]
    fn test_failed_batch_refresh_exits_with_run_error() {
        let mut summary = TransferSummary::new(3, 0);
        summary.credential_halt = true;
        assert_eq!(exit_code(&summary), 5);
    }
}
