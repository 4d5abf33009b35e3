// msgexport - Stored search export for Elasticsearch
// Copyright (c) 2025 msgexport Contributors
// Licensed under the MIT License

//! # msgexport - Stored search export for Elasticsearch
//!
//! msgexport streams the messages matched by a stored search out of an
//! Elasticsearch cluster, chunk by chunk, without holding the result set in
//! memory.
//!
//! ## Overview
//!
//! This library provides:
//! - **Building** an export request from a stored search, a search type id and
//!   a result format
//! - **Paginating** through the matching messages with `search_after` cursors,
//!   one chunk per page
//! - **Resolving** the indices that can hold messages for a stream set and
//!   time range
//! - **Decorating** query strings and delivered chunks
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export orchestration, pagination and decorators
//! - [`adapters`] - Search engine and index resolution
//! - [`domain`] - Searches, requests, messages and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msgexport::config::load_config;
//! use msgexport::core::export::{CollectingSink, MessagesExporter};
//! use msgexport::domain::{ResultFormat, Search};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("msgexport.toml")?;
//!     let exporter = MessagesExporter::from_config(&config)?;
//!
//!     let search: Search = serde_json::from_str(&std::fs::read_to_string("search.json")?)?;
//!     let mut sink = CollectingSink::new();
//!
//!     let summary = exporter
//!         .export_search(&search, Some("message-list-1"), &ResultFormat::default(), &mut sink)
//!         .await?;
//!
//!     println!("Exported {} messages", summary.messages_delivered);
//!     Ok(())
//! }
//! ```
//!
//! ## Chunks and limits
//!
//! Every page fetched from the engine is handed to the sink as one
//! [`SimpleMessageChunk`](domain::SimpleMessageChunk); only the first one is
//! flagged as such. A limit ends the export after the page that reaches it,
//! and that page is delivered whole, so an export with chunk size 2 and
//! limit 3 yields 4 messages.
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::ExportError`]. Failures inside the
//! backend are wrapped as `ExportError::Engine` and keep their
//! [`domain::EngineError`] cause:
//!
//! ```rust,no_run
//! use msgexport::domain::{EngineError, ExportError};
//!
//! fn describe(err: &ExportError) -> &'static str {
//!     match err.engine_cause() {
//!         Some(EngineError::Query(_)) => "rejected query",
//!         Some(_) => "engine failure",
//!         None => "request could not be built",
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
