//! Core business logic for Ferry.
//!
//! # Modules
//!
//! - [`credentials`] - access tokens, refresh and renewal
//! - [`resolver`] - destination folder resolution and caching
//! - [`state`] - checkpoint and transferred-file ledger
//! - [`transfer`] - run orchestration
//!
//! # Transfer Workflow
//!
//! 1. **Load Records**: Read the input CSV
//! 2. **Load State**: Read the ledger and the checkpoint
//! 3. **Authenticate**: Obtain Zoho and Drive access tokens
//! 4. **Prime Cache**: List existing folders under the parent folder
//! 5. **Transfer**: For each record, resolve the folder, fetch, upload, record
//! 6. **Checkpoint**: Advance the resume index as records settle
//! 7. **Report**: Log and print the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//! use ferry::core::transfer::TransferCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let prepared = TransferCoordinator::from_config(&config, shutdown_rx)?
//!     .prepare()
//!     .await?;
//! let summary = prepared.run().await?;
//!
//! println!("Recorded: {}", summary.recorded);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod resolver;
pub mod state;
pub mod transfer;
