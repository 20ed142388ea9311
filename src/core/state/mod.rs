//! Dedup ledger and checkpoint persistence
//!
//! Two pieces of state survive between runs:
//! - the ledger: ids of every file already uploaded
//! - the checkpoint: the input index the next run starts from
//!
//! The ledger is the dedup authority. The checkpoint is only an
//! optimization and may safely fall back to 0.

pub mod cursor;
pub mod manager;
pub mod storage;

pub use cursor::CheckpointCursor;
pub use manager::StateManager;
pub use storage::{FileStateStorage, StateStorage, TransferredSet};
