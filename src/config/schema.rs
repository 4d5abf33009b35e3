//! Configuration schema types
//!
//! Maps one-to-one onto the sections of `msgexport.toml`.

use crate::config::SecretString;
use crate::domain::request::{DEFAULT_CHUNK_SIZE, DEFAULT_FIELDS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest page size accepted from configuration
pub const MAX_CHUNK_SIZE: usize = 10_000;

/// Main msgexport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MsgExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Search engine connection
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,

    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,

    /// Index resolution
    #[serde(default)]
    pub indices: IndicesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MsgExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.elasticsearch.validate()?;
        self.export.validate()?;
        self.indices.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("elasticsearch.retry.max_retries must be <= 10".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("elasticsearch.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "elasticsearch.retry.initial_delay_ms must be <= max_delay_ms".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Elasticsearch connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Username for basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// Disable only against development clusters with self-signed certificates.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Accept query strings whose terms start with `*` or `?`
    #[serde(default)]
    pub allow_leading_wildcard_searches: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ElasticsearchConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("elasticsearch.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("elasticsearch.base_url must start with http:// or https://".to_string());
        }

        let has_password = self
            .password
            .as_ref()
            .map(|p| !p.expose_secret().is_empty())
            .unwrap_or(false);
        if self.username.is_some() != has_password {
            return Err(
                "elasticsearch.username and elasticsearch.password must be set together"
                    .to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("elasticsearch.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            tls_verify: true,
            timeout_seconds: default_timeout_seconds(),
            allow_leading_wildcard_searches: false,
            retry: RetryConfig::default(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Messages per page and chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Columns used when neither the command line nor the format names any
    #[serde(default = "default_fields")]
    pub default_fields: Vec<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(format!(
                "export.chunk_size must be between 1 and {MAX_CHUNK_SIZE}"
            ));
        }

        if self.default_fields.is_empty() {
            return Err("export.default_fields cannot be empty".to_string());
        }

        if self.default_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("export.default_fields cannot contain empty names".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            default_fields: default_fields(),
        }
    }
}

/// Index resolution configuration
///
/// With no `ranges` every export searches `default_patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicesConfig {
    #[serde(default = "default_index_patterns")]
    pub default_patterns: Vec<String>,

    #[serde(default)]
    pub ranges: Vec<IndexRangeConfig>,
}

impl IndicesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ranges.is_empty() && self.default_patterns.is_empty() {
            return Err(
                "indices.default_patterns cannot be empty when no indices.ranges are configured"
                    .to_string(),
            );
        }

        for range in &self.ranges {
            range.validate()?;
        }

        Ok(())
    }
}

impl Default for IndicesConfig {
    fn default() -> Self {
        Self {
            default_patterns: default_index_patterns(),
            ranges: Vec::new(),
        }
    }
}

/// Time span and stream membership of one index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRangeConfig {
    pub index_name: String,

    /// Oldest message timestamp in the index
    pub begin: DateTime<Utc>,

    /// Newest message timestamp in the index
    pub end: DateTime<Utc>,

    /// Streams writing into the index; empty means every stream
    #[serde(default)]
    pub streams: Vec<String>,
}

impl IndexRangeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.index_name.trim().is_empty() {
            return Err("indices.ranges.index_name cannot be empty".to_string());
        }
        if self.begin > self.end {
            return Err(format!(
                "indices.ranges '{}': begin must not be after end",
                self.index_name
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Time-based rotation: `daily`, `hourly` or `never`
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_index_patterns() -> Vec<String> {
    vec!["graylog_*".to_string()]
}

fn default_local_path() -> String {
    "/var/log/msgexport".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
