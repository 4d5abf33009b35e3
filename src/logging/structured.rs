//! Structured logging setup using tracing
//!
//! Human-readable events on stderr, plus JSON lines in a rotating file when
//! `logging.local_enabled` is set. Both layers share one filter.

use crate::config::LoggingConfig;
use crate::domain::{ExportError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FILE_NAME: &str = "msgexport.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the file writer alive; dropping it flushes buffered lines
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber
///
/// `RUST_LOG` wins over `log_level`.
///
/// # Errors
///
/// `ExportError::Configuration` for an unknown level, an unusable log
/// directory, or when a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use msgexport::logging::init_logging;
/// use msgexport::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("msgexport={level}")));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(filter.clone())];
    let mut file_guard = None;

    if config.local_enabled {
        let (layer, guard) = file_layer(config, filter)?;
        layers.push(layer);
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| ExportError::Configuration(format!("Logging already initialized: {e}")))?;

    tracing::debug!(
        level = %level,
        file_logging = config.local_enabled,
        path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn console_layer(filter: EnvFilter) -> BoxedLayer {
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter)
        .boxed()
}

fn file_layer(config: &LoggingConfig, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard)> {
    let dir = Path::new(&config.local_path);
    std::fs::create_dir_all(dir).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;

    let appender = RollingFileAppender::new(rotation(&config.local_rotation), dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();

    Ok((layer, guard))
}

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(ExportError::Configuration(format!(
            "Invalid log level '{other}'. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("trace" => Level::TRACE)]
    #[test_case("DEBUG" => Level::DEBUG)]
    #[test_case(" info " => Level::INFO)]
    #[test_case("warning" => Level::WARN)]
    #[test_case("Error" => Level::ERROR)]
    fn test_parse_log_level(level: &str) -> Level {
        parse_log_level(level).unwrap()
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("invalid").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_rotation_mapping() {
        assert_eq!(rotation("hourly"), Rotation::HOURLY);
        assert_eq!(rotation("never"), Rotation::NEVER);
        assert_eq!(rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            local_path: dir.path().join("nested/logs").to_string_lossy().to_string(),
            ..LoggingConfig::default()
        };

        let (_layer, guard) = file_layer(&config, EnvFilter::new("msgexport=info")).unwrap();
        drop(guard);

        assert!(dir.path().join("nested/logs").is_dir());
    }
}
