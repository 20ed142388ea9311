//! Domain models and types for Ferry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SourceFileId`], [`ContainerId`], [`DestinationKey`])
//! - **Input records** ([`Record`])
//! - **Error types** ([`FerryError`], [`AuthError`], [`SourceError`], [`DestinationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use ferry::domain::{ContainerId, SourceFileId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let file_id = SourceFileId::new("4150868000012345")?;
//! let folder_id = ContainerId::new("1VeR-E_NVIGFvYi68U")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: ContainerId = file_id;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AuthError, DestinationError, FerryError, SourceError};
pub use ids::{ContainerId, DestinationKey, SourceFileId};
pub use record::Record;
pub use result::Result;
