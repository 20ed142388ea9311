//! Status command implementation
//!
//! This module implements the `status` command, which reports the resume
//! position and the transferred-file ledger without touching the network.

use crate::adapters::records::CsvRecordSource;
use crate::adapters::traits::RecordSource;
use crate::config::load_config;
use crate::core::state::{FileStateStorage, StateManager};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Skip reading the input CSV
    #[arg(long)]
    pub no_input: bool,
}

/// Snapshot of persisted progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub next_index: usize,
    pub has_checkpoint: bool,
    pub transferred: usize,
    pub input_records: Option<usize>,
}

impl StatusReport {
    /// Records from the resume index to the end of the input
    pub fn remaining(&self) -> Option<usize> {
        self.input_records
            .map(|total| total.saturating_sub(self.next_index))
    }
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking transfer status");

        println!("Transfer Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let storage = Arc::new(FileStateStorage::new(
            &config.state.checkpoint_path,
            &config.state.ledger_path,
        ));
        let state = match StateManager::load(storage).await {
            Ok(s) => s,
            Err(e) => {
                println!("Failed to load transfer state");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let input_records = if self.no_input {
            None
        } else {
            match CsvRecordSource::from_config(&config.input).load() {
                Ok(records) => Some(records.len()),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read input for status");
                    println!("Input unavailable: {e}");
                    None
                }
            }
        };

        let report = StatusReport {
            next_index: state.start_index(),
            has_checkpoint: state.has_checkpoint(),
            transferred: state.transferred_count(),
            input_records,
        };

        println!("  Checkpoint file: {}", config.state.checkpoint_path);
        println!("  Ledger file: {}", config.state.ledger_path);
        println!(
            "  Next index: {}{}",
            report.next_index,
            if report.has_checkpoint {
                ""
            } else {
                " (no checkpoint, next run starts from the beginning)"
            }
        );
        println!("  Files transferred: {}", report.transferred);
        if let Some(total) = report.input_records {
            println!("  Records in input: {total}");
        }
        if let Some(remaining) = report.remaining() {
            println!("  Records remaining: {remaining}");
        }
        println!();

        Ok(0)
    }
}
