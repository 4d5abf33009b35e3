//! Domain error types
//!
//! This module defines the error hierarchy for msgexport.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main msgexport error type
///
/// Request-building failures (`Configuration`, `UnsupportedSearchType`) are raised
/// before the search engine is contacted. Everything that goes wrong inside the
/// backend is carried by the `Engine` variant, which keeps the original cause.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Ambiguous or empty search, unknown search type id, invalid settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The resolved search type is not a message list
    #[error("Unsupported search type: {0}")]
    UnsupportedSearchType(String),

    /// Invalid request values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure inside the export backend
    #[error("Export failed: {0}")]
    Engine(#[from] EngineError),

    /// The chunk sink rejected a chunk
    #[error("Sink error: {0}")]
    Sink(String),

    /// The export was stopped by a shutdown signal
    #[error("Export interrupted after {chunks} chunk(s)")]
    Interrupted { chunks: usize },
}

impl ExportError {
    /// Returns the engine cause if this error came out of the backend
    pub fn engine_cause(&self) -> Option<&EngineError> {
        match self {
            ExportError::Engine(cause) => Some(cause),
            _ => None,
        }
    }
}

/// Search engine errors
///
/// Errors that occur while resolving indices or talking to the search engine.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or disallowed query, e.g. an unsanctioned leading wildcard
    #[error("Invalid query: {0}")]
    Query(String),

    /// Transport or backend failure while fetching a page
    #[error("Search execution failed: {0}")]
    Execution(String),

    /// Index lookup for the request scope failed
    #[error("Index resolution failed: {0}")]
    IndexResolution(String),

    /// Failed to connect to the search engine
    #[error("Failed to connect to search engine: {0}")]
    ConnectionFailed(String),

    /// Invalid response from the engine
    #[error("Invalid response from search engine: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

impl EngineError {
    /// True for query validation failures
    pub fn is_query_error(&self) -> bool {
        matches!(self, EngineError::Query(_))
    }

    /// True for failures worth retrying at the transport level
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::ConnectionFailed(_) | EngineError::ServerError { .. }
        )
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
