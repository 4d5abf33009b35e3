//! Export pipeline
//!
//! This module provides the export logic for msgexport, including:
//! - Request building from stored searches
//! - The paginated export backend
//! - Orchestration with chunk decoration
//! - Chunk sinks and the run summary

pub mod backend;
pub mod builder;
pub mod exporter;
pub mod query;
pub mod sink;
pub mod summary;

pub use backend::{BackendConfig, ExportBackend, PaginatedExportBackend};
pub use builder::{ExportRequestBuilder, ResolvedExport};
pub use exporter::MessagesExporter;
pub use sink::{ChunkSink, CollectingSink, InterruptibleSink, NdjsonChunkWriter};
pub use summary::{ExportSummary, StopReason};
