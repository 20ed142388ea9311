//! Logging and observability
//!
//! Structured logging on top of `tracing`:
//! - Human-readable console output
//! - JSON log file with rotation
//! - `RUST_LOG` override of the configured level
//!
//! # Example
//!
//! ```no_run
//! use ferry::logging::init_logging;
//! use ferry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(source_file_id = "4150868000012345", "Uploaded file");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a record that could not be transferred
///
/// # Example
///
/// ```no_run
/// use ferry::log_record_failure;
///
/// log_record_failure!(7, "4150868000012345", "upload", "HTTP 503");
/// ```
#[macro_export]
macro_rules! log_record_failure {
    ($index:expr, $source_file_id:expr, $stage:expr, $message:expr) => {
        tracing::error!(
            index = $index,
            source_file_id = %$source_file_id,
            stage = %$stage,
            error = %$message,
            "Record transfer failed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ferry::log_error_with_context;
/// use ferry::domain::FerryError;
///
/// let error = FerryError::Persistence("disk full".to_string());
/// log_error_with_context!(&error, "Failed to save ledger");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress at a batch boundary
///
/// # Example
///
/// ```no_run
/// use ferry::log_batch_progress;
///
/// log_batch_progress!(2, 100, 1000);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($batch:expr, $index:expr, $total:expr) => {
        tracing::info!(
            batch = $batch,
            index = $index,
            total = $total,
            progress_pct = ($index as f64 / ($total as f64).max(1.0) * 100.0),
            "Batch boundary reached"
        );
    };
}
