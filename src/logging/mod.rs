//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for interactive runs
//! - JSON-formatted local log files with rotation
//! - Configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use msgexport::logging::init_logging;
//! use msgexport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use msgexport::log_export_start;
///
/// log_export_start!("elasticsearch", 2, 1000, Some(5000u64));
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($engine:expr, $index_count:expr, $chunk_size:expr, $limit:expr) => {
        tracing::info!(
            engine = $engine,
            index_count = $index_count,
            chunk_size = $chunk_size,
            limit = ?$limit,
            "Starting export"
        );
    };
}

/// Log one delivered page
///
/// # Example
///
/// ```no_run
/// use msgexport::log_page_fetched;
///
/// log_page_fetched!(3, 1000, 3000u64);
/// ```
#[macro_export]
macro_rules! log_page_fetched {
    ($page:expr, $hits:expr, $delivered:expr) => {
        tracing::debug!(
            page = $page,
            hits = $hits,
            delivered = $delivered,
            "Delivered page"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use msgexport::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42u64, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use msgexport::log_error_with_context;
/// use msgexport::domain::ExportError;
///
/// let error = ExportError::Configuration("ambiguous search".to_string());
/// log_error_with_context!(&error, "Failed to build export request");
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

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        crate::log_export_start!("memory", 1usize, 2usize, None::<u64>);
        crate::log_page_fetched!(1usize, 2usize, 2u64);
        crate::log_export_complete!(2u64, Duration::from_millis(5));
        crate::log_error_with_context!("boom", "test");
    }
}
