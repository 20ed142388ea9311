// Ferry - Zoho CRM to Google Drive transfer tool
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

//! # Ferry - Zoho CRM to Google Drive transfer
//!
//! Ferry moves files stored in Zoho CRM into per-record folders in Google
//! Drive. Runs are resumable: a checkpoint file records where to pick up and
//! a ledger records which files are already uploaded, so a rerun never
//! uploads a file twice.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (credentials, folder resolution, state, transfer)
//! - [`adapters`] - External integrations (Zoho CRM, Google Drive, CSV input)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//! use ferry::core::transfer::TransferCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ferry.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let prepared = TransferCoordinator::from_config(&config, shutdown_rx)?
//!         .prepare()
//!         .await?;
//!     let summary = prepared.run().await?;
//!
//!     println!("Transferred {} files", summary.recorded);
//!     Ok(())
//! }
//! ```
//!
//! ## Credentials
//!
//! Each remote API has its own [`core::credentials::CredentialManager`].
//! Tokens are published through a watch channel with a generation number, so
//! a caller that sees a 401 can tell whether someone already renewed the
//! token before asking for a new one.
//!
//! ## Error Handling
//!
//! Per-record failures are logged and counted; the record is retried on the
//! next run. Only [`domain::FerryError::is_fatal`] errors stop a run:
//!
//! ```rust
//! use ferry::domain::{FerryError, SourceError};
//!
//! let err: FerryError = SourceError::Http { status: 503, message: "busy".into() }.into();
//! assert!(!err.is_fatal());
//!
//! let err = FerryError::Persistence("disk full".into());
//! assert!(err.is_fatal());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
