//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "msgexport.toml")]
    pub output: String,

    /// Include every option with explanations
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing msgexport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your cluster settings", self.output);
                println!("  2. For secured clusters set MSGEXPORT_ELASTICSEARCH_USERNAME and");
                println!("     MSGEXPORT_ELASTICSEARCH_PASSWORD (or a .env file)");
                println!("  3. Validate configuration: msgexport validate-config");
                println!("  4. Run export: msgexport export --search search.json");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# msgexport configuration

[application]
log_level = "info"

[elasticsearch]
base_url = "http://localhost:9200"
# username = "${MSGEXPORT_ES_USERNAME}"
# password = "${MSGEXPORT_ES_PASSWORD}"
tls_verify = true
allow_leading_wildcard_searches = false

[export]
chunk_size = 1000
default_fields = ["timestamp", "source", "message"]

[indices]
default_patterns = ["graylog_*"]

[logging]
local_enabled = true
local_path = "/var/log/msgexport"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# msgexport configuration
#
# Values of the form ${VAR} are replaced with environment variables when the
# file is loaded. Any setting can also be overridden with
# MSGEXPORT_<SECTION>_<KEY>, e.g. MSGEXPORT_EXPORT_CHUNK_SIZE=500.

# ============================================================================
# Application
# ============================================================================
[application]
# trace, debug, info, warn, error
log_level = "info"

# ============================================================================
# Elasticsearch
# ============================================================================
[elasticsearch]
base_url = "http://localhost:9200"

# Basic authentication; set both or neither
# username = "${MSGEXPORT_ES_USERNAME}"
# password = "${MSGEXPORT_ES_PASSWORD}"

# Verify TLS certificates
tls_verify = true

# Per-request timeout
timeout_seconds = 60

# Accept query terms that start with * or ?. These are slow on large
# indices, so exports reject them unless enabled.
allow_leading_wildcard_searches = false

# Retries for connection failures and 5xx responses
[elasticsearch.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Export defaults
# ============================================================================
[export]
# Messages per page; every page is delivered as one chunk (1 - 10000)
chunk_size = 1000

# Columns when neither the command line nor the search names any
default_fields = ["timestamp", "source", "message"]

# ============================================================================
# Index resolution
# ============================================================================
[indices]
# Searched when no ranges are configured
default_patterns = ["graylog_*"]

# Known index ranges. When present, an export only searches indices whose
# range overlaps the requested time range and that hold one of the
# requested streams (empty streams = every stream).
#
# [[indices.ranges]]
# index_name = "graylog_0"
# begin = "2015-01-01T00:00:00Z"
# end = "2015-01-01T23:59:59Z"
# streams = ["stream-01"]

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files next to the console output (stderr)
local_enabled = true
local_path = "/var/log/msgexport"

# daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
