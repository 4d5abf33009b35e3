//! Configuration management for msgexport.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `MSGEXPORT_*`
//! environment overrides, defaults for every optional setting and validation
//! on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use msgexport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("msgexport.toml")?;
//!
//! println!("Elasticsearch: {}", config.elasticsearch.base_url);
//! println!("Chunk size: {}", config.export.chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ElasticsearchConfig`] - Cluster connection, credentials, retries
//! - [`ExportConfig`] - Page size and default columns
//! - [`IndicesConfig`] - Index patterns and known index ranges
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [elasticsearch]
//! base_url = "https://es.example.com:9200"
//! username = "exporter"
//! password = "${MSGEXPORT_ES_PASSWORD}"
//!
//! [export]
//! chunk_size = 1000
//! default_fields = ["timestamp", "source", "message"]
//!
//! [indices]
//! default_patterns = ["graylog_*"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ElasticsearchConfig, ExportConfig, IndexRangeConfig, IndicesConfig,
    LoggingConfig, MsgExportConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
