//! Transfer summary and reporting

use super::outcome::{RecordOutcome, SkipReason, TransferStage};
use std::time::Duration;

/// A record that failed during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Input index of the record
    pub index: usize,

    /// Source file id, empty if the record had none
    pub source_file_id: String,

    pub stage: TransferStage,

    pub message: String,
}

/// Summary of one transfer run
#[derive(Debug, Clone, Default)]
pub struct TransferSummary {
    /// Total records in the input
    pub total_records: usize,

    /// Records processed this run
    pub attempted: usize,

    /// Uploaded and added to the ledger
    pub recorded: usize,

    /// Skipped for lack of a source id
    pub skipped_empty: usize,

    /// Skipped because the ledger already had them
    pub skipped_duplicate: usize,

    /// Left for a later run
    pub failed: usize,

    /// Destination folders created
    pub folders_created: usize,

    /// First index of the window
    pub start_index: usize,

    /// Index the next run will resume from
    pub next_index: usize,

    /// The input was fully walked and the checkpoint removed
    pub checkpoint_cleared: bool,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,

    /// The run stopped at a batch boundary because the token refresh failed
    pub credential_halt: bool,

    pub duration: Duration,

    pub errors: Vec<RecordError>,
}

impl TransferSummary {
    /// Create an empty summary for a run starting at `start_index`
    pub fn new(total_records: usize, start_index: usize) -> Self {
        Self {
            total_records,
            start_index,
            next_index: start_index,
            ..Default::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count one outcome
    pub fn add_outcome(&mut self, index: usize, source_file_id: &str, outcome: &RecordOutcome) {
        self.attempted += 1;
        match outcome {
            RecordOutcome::Recorded { .. } => self.recorded += 1,
            RecordOutcome::Skipped(SkipReason::EmptySourceId) => self.skipped_empty += 1,
            RecordOutcome::Skipped(SkipReason::AlreadyTransferred) => self.skipped_duplicate += 1,
            RecordOutcome::Failed(failure) => {
                self.failed += 1;
                self.errors.push(RecordError {
                    index,
                    source_file_id: source_file_id.to_string(),
                    stage: failure.stage,
                    message: failure.message.clone(),
                });
            }
        }
    }

    /// Skipped records of either kind
    pub fn skipped(&self) -> usize {
        self.skipped_empty + self.skipped_duplicate
    }

    /// Whether every processed record was recorded or skipped
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Records after the window that a later run still has to cover
    pub fn remaining(&self) -> usize {
        if self.checkpoint_cleared {
            0
        } else {
            self.total_records.saturating_sub(self.next_index)
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            attempted = self.attempted,
            recorded = self.recorded,
            skipped_empty = self.skipped_empty,
            skipped_duplicate = self.skipped_duplicate,
            failed = self.failed,
            folders_created = self.folders_created,
            start_index = self.start_index,
            next_index = self.next_index,
            duration_secs = self.duration.as_secs(),
            "Transfer run finished"
        );

        if self.checkpoint_cleared {
            tracing::info!("Processing complete");
        } else if self.credential_halt {
            tracing::error!(next_index = self.next_index, "Processing stopped, no usable source token");
        } else if self.interrupted {
            tracing::warn!(next_index = self.next_index, "Processing interrupted");
        } else {
            tracing::info!(
                next_index = self.next_index,
                remaining = self.remaining(),
                "Processing stopped at index {}",
                self.next_index
            );
        }

        for error in &self.errors {
            tracing::warn!(
                index = error.index,
                source_file_id = %error.source_file_id,
                stage = %error.stage,
                message = %error.message,
                "Record not transferred"
            );
        }
    }
}
