//! Transfer orchestration
//!
//! - [`coordinator`] - startup sequence and adapter wiring
//! - [`engine`] - the per-record pipeline
//! - [`pacer`] - batch windows and delays
//! - [`outcome`] - per-record results
//! - [`summary`] - run reporting

pub mod coordinator;
pub mod engine;
pub mod outcome;
pub mod pacer;
pub mod summary;

pub use coordinator::{PreparedTransfer, TransferComponents, TransferCoordinator, TransferSettings};
pub use engine::{EngineOptions, TransferEngine};
pub use outcome::{RecordFailure, RecordOutcome, SkipReason, TransferStage};
pub use pacer::{BatchPacer, PacingPolicy};
pub use summary::{RecordError, TransferSummary};
