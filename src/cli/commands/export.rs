//! Export command implementation
//!
//! Loads a stored search from a JSON file and streams its messages as NDJSON
//! to a file or to stdout. Progress and the summary go to stderr so stdout
//! stays clean for piping.

use crate::config::load_config;
use crate::core::export::{
    ChunkSink, ExportSummary, InterruptibleSink, MessagesExporter, NdjsonChunkWriter,
};
use crate::domain::{EngineError, ExportError, ResultFormat, Search, Sort};
use clap::Args;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Stored search definition (JSON)
    #[arg(short, long)]
    pub search: PathBuf,

    /// Message list to export; required when the search has several queries
    #[arg(short = 't', long)]
    pub search_type_id: Option<String>,

    /// Columns to export, in order (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Sort keys as field[:asc|desc] (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<Sort>,

    /// Stop after the page that reaches this many messages
    #[arg(long)]
    pub limit: Option<u64>,

    /// Override export.chunk_size
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(search = %self.search.display(), "Starting export command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        if let Some(chunk_size) = self.chunk_size {
            tracing::info!(chunk_size, "Overriding chunk size from CLI");
            config.export.chunk_size = chunk_size;
            if let Err(e) = config.validate() {
                eprintln!("❌ Configuration validation failed: {e}");
                return Ok(2);
            }
        }

        let search = match self.load_search() {
            Ok(search) => search,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load search");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let result_format = ResultFormat {
            fields_in_order: if self.fields.is_empty() {
                config.export.default_fields.clone()
            } else {
                self.fields.clone()
            },
            sort: self.sort.clone(),
            limit: self.limit,
        };

        let exporter = match MessagesExporter::from_config(&config) {
            Ok(exporter) => exporter,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create exporter");
                eprintln!("❌ Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let writer: Box<dyn Write + Send> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout()),
        };
        let mut ndjson = NdjsonChunkWriter::new(writer);

        eprintln!("🚀 Exporting search {}...", search.id);

        let result = {
            let mut sink = InterruptibleSink::new(&mut ndjson, shutdown_signal);
            exporter
                .export_search(
                    &search,
                    self.search_type_id.as_deref(),
                    &result_format,
                    &mut sink as &mut dyn ChunkSink,
                )
                .await
        };

        match result {
            Ok(summary) => {
                summary.log_summary();
                print_summary(&summary);
                eprintln!("✅ Export completed successfully!");
                Ok(0)
            }
            Err(ExportError::Interrupted { chunks }) => {
                eprintln!();
                eprintln!(
                    "⚠️  Export interrupted after {chunks} chunk(s), {} message(s) written.",
                    ndjson.messages_written()
                );
                tracing::info!("Export interrupted by user signal");
                Ok(130)
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("❌ Export failed: {e}");
                if ndjson.messages_written() > 0 {
                    eprintln!("   {} message(s) were written before the failure", ndjson.messages_written());
                }
                Ok(exit_code_for(&e))
            }
        }
    }

    fn load_search(&self) -> crate::domain::Result<Search> {
        let content = fs::read_to_string(&self.search).map_err(|e| {
            ExportError::Configuration(format!(
                "Failed to read search file {}: {e}",
                self.search.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ExportError::Configuration(format!(
                "Failed to parse search file {}: {e}",
                self.search.display()
            ))
        })
    }
}

fn print_summary(summary: &ExportSummary) {
    eprintln!();
    eprintln!("📊 Export Summary:");
    eprintln!("  Export ID: {}", summary.export_id);
    eprintln!("  Messages: {}", summary.messages_delivered);
    eprintln!("  Chunks: {}", summary.chunks_delivered);
    eprintln!("  Pages fetched: {}", summary.pages_fetched);
    eprintln!("  Indices searched: {}", summary.indices_searched);
    if let Some(reason) = summary.stop_reason {
        eprintln!("  Stopped: {reason}");
    }
    eprintln!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    eprintln!("  Throughput: {:.1} msg/s", summary.throughput());
    eprintln!();
}

/// Process exit code for a failed export
///
/// 2 for anything wrong with the request or configuration, 4 when the
/// engine can't be reached or fails, 130 after an interrupt, 5 otherwise.
pub fn exit_code_for(error: &ExportError) -> i32 {
    match error {
        ExportError::Configuration(_)
        | ExportError::UnsupportedSearchType(_)
        | ExportError::Validation(_) => 2,
        ExportError::Engine(EngineError::Query(_)) => 2,
        ExportError::Engine(_) => 4,
        ExportError::Interrupted { .. } => 130,
        ExportError::Sink(_) => 5,
    }
}
