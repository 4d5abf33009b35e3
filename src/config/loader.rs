//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MsgExportConfig;
use super::secret::secret_string;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MsgExportConfig
/// 4. Applies environment variable overrides (MSGEXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `ExportError::Configuration` if the file is missing or unreadable,
/// a referenced environment variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use msgexport::config::loader::load_config;
///
/// let config = load_config("msgexport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MsgExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MsgExportConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ExportError::Configuration(format!("Invalid value '{value}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using MSGEXPORT_* prefix
///
/// Environment variables follow the pattern: MSGEXPORT_<SECTION>_<KEY>
/// For example: MSGEXPORT_ELASTICSEARCH_BASE_URL, MSGEXPORT_EXPORT_CHUNK_SIZE
fn apply_env_overrides(config: &mut MsgExportConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("MSGEXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_BASE_URL") {
        config.elasticsearch.base_url = val;
    }
    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_USERNAME") {
        config.elasticsearch.username = Some(val);
    }
    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_PASSWORD") {
        config.elasticsearch.password = Some(secret_string(val));
    }
    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_TLS_VERIFY") {
        config.elasticsearch.tls_verify =
            parse_override("MSGEXPORT_ELASTICSEARCH_TLS_VERIFY", &val)?;
    }
    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_TIMEOUT_SECONDS") {
        config.elasticsearch.timeout_seconds =
            parse_override("MSGEXPORT_ELASTICSEARCH_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("MSGEXPORT_ELASTICSEARCH_ALLOW_LEADING_WILDCARD_SEARCHES") {
        config.elasticsearch.allow_leading_wildcard_searches =
            parse_override("MSGEXPORT_ELASTICSEARCH_ALLOW_LEADING_WILDCARD_SEARCHES", &val)?;
    }

    if let Some(val) = var("MSGEXPORT_EXPORT_CHUNK_SIZE") {
        config.export.chunk_size = parse_override("MSGEXPORT_EXPORT_CHUNK_SIZE", &val)?;
    }
    if let Some(val) = var("MSGEXPORT_EXPORT_DEFAULT_FIELDS") {
        config.export.default_fields = split_list(&val);
    }

    if let Some(val) = var("MSGEXPORT_INDICES_DEFAULT_PATTERNS") {
        config.indices.default_patterns = split_list(&val);
    }

    if let Some(val) = var("MSGEXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("MSGEXPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("MSGEXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("MSGEXPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Comma separated list, blanks dropped
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
