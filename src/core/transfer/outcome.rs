//! Per-record outcomes

use crate::core::resolver::ResolutionOrigin;
use crate::domain::{ContainerId, SourceFileId};
use std::fmt;

/// Pipeline stage a record failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStage {
    DedupCheck,
    ResolveDestination,
    FetchSource,
    Upload,
    Record,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::DedupCheck => "dedup_check",
            TransferStage::ResolveDestination => "resolve_destination",
            TransferStage::FetchSource => "fetch_source",
            TransferStage::Upload => "upload",
            TransferStage::Record => "record",
        };
        f.write_str(name)
    }
}

/// Why a record was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record has no source file id
    EmptySourceId,
    /// The id is already in the ledger
    AlreadyTransferred,
}

/// A record that could not be transferred this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub stage: TransferStage,
    pub message: String,
}

/// Result of processing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Uploaded and added to the ledger
    Recorded {
        source_file_id: SourceFileId,
        container_id: ContainerId,
        origin: ResolutionOrigin,
    },
    /// Nothing to do
    Skipped(SkipReason),
    /// Left for a later run
    Failed(RecordFailure),
}

impl RecordOutcome {
    pub(crate) fn failed(stage: TransferStage, message: impl Into<String>) -> Self {
        RecordOutcome::Failed(RecordFailure {
            stage,
            message: message.into(),
        })
    }

    /// Recorded or skipped: the checkpoint may move past this record
    pub fn is_settled(&self) -> bool {
        !matches!(self, RecordOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_not_settled() {
        let outcome = RecordOutcome::failed(TransferStage::Upload, "HTTP 503");
        assert!(!outcome.is_settled());
        assert!(RecordOutcome::Skipped(SkipReason::EmptySourceId).is_settled());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(TransferStage::FetchSource.to_string(), "fetch_source");
        assert_eq!(TransferStage::ResolveDestination.to_string(), "resolve_destination");
    }
}
