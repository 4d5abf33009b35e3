//! Core business logic for msgexport.
//!
//! # Modules
//!
//! - [`export`] - Request building, the paginated backend and orchestration
//! - [`decorate`] - Query string and chunk decorators
//!
//! # Export Workflow
//!
//! 1. **Build**: resolve a `MessagesRequest` from a stored search
//! 2. **Resolve indices**: ask the index resolver once per run
//! 3. **Fetch**: page through the engine with `search_after` cursors
//! 4. **Decorate**: apply the message list's decorators to each chunk
//! 5. **Deliver**: hand every chunk to the sink before the next fetch
//! 6. **Report**: return an `ExportSummary`
//!
//! # Example
//!
//! ```rust,no_run
//! use msgexport::adapters::elasticsearch::ElasticsearchEngine;
//! use msgexport::adapters::index::create_index_resolver;
//! use msgexport::config::load_config;
//! use msgexport::core::decorate::{ConfiguredChunkDecorator, ParameterQueryStringDecorator};
//! use msgexport::core::export::{
//!     BackendConfig, CollectingSink, ExportRequestBuilder, MessagesExporter,
//!     PaginatedExportBackend,
//! };
//! use msgexport::domain::{ResultFormat, Search};
//! use std::sync::Arc;
//!
//! # async fn example(search: Search) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("msgexport.toml")?;
//!
//! let backend = PaginatedExportBackend::new(
//!     Arc::new(ElasticsearchEngine::new(config.elasticsearch.clone())?),
//!     create_index_resolver(&config.indices),
//!     BackendConfig::default(),
//! );
//! let exporter = MessagesExporter::new(
//!     Arc::new(backend),
//!     ExportRequestBuilder::new(Arc::new(ParameterQueryStringDecorator::new()?)),
//!     Arc::new(ConfiguredChunkDecorator::new()?),
//! );
//!
//! let mut sink = CollectingSink::new();
//! let summary = exporter
//!     .export_search(&search, None, &ResultFormat::default(), &mut sink)
//!     .await?;
//!
//! println!("Exported {} messages", summary.messages_delivered);
//! # Ok(())
//! # }
//! ```

pub mod decorate;
pub mod export;
