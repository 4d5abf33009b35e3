//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the msgexport configuration file.

use crate::config::{load_config, MsgExportConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        Ok(0)
    }
}

fn print_summary(config: &MsgExportConfig) {
    let es = &config.elasticsearch;

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Elasticsearch: {}", es.base_url);
    println!(
        "  Authentication: {}",
        match &es.username {
            Some(user) => format!("basic ({user})"),
            None => "none".to_string(),
        }
    );
    println!("  TLS Verify: {}", es.tls_verify);
    println!("  Leading Wildcards: {}", es.allow_leading_wildcard_searches);
    println!("  Max Retries: {}", es.retry.max_retries);
    println!("  Chunk Size: {}", config.export.chunk_size);
    println!("  Default Fields: {}", config.export.default_fields.join(", "));
    if config.indices.ranges.is_empty() {
        println!(
            "  Index Patterns: {}",
            config.indices.default_patterns.join(", ")
        );
    } else {
        println!("  Index Ranges: {}", config.indices.ranges.len());
    }
    if config.logging.local_enabled {
        println!(
            "  Log Files: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msgexport.toml");
        fs::write(&path, "[export]\nchunk_size = 500\n").unwrap();

        let code = ValidateArgs {}.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msgexport.toml");
        fs::write(&path, "[export]\nchunk_size = 0\n").unwrap();

        let code = ValidateArgs {}.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_missing_config() {
        let code = ValidateArgs {}
            .execute("/nonexistent/msgexport.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
