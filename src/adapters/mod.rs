//! External system integrations for msgexport.
//!
//! - [`engine`] - Search engine abstraction used by the export backend
//! - [`elasticsearch`] - Elasticsearch implementation of that abstraction
//! - [`index`] - Index resolution from stream scope and time range
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The export backend only sees
//! the [`engine::SearchEngine`] and [`index::IndexResolver`] traits.
//!
//! ```rust,no_run
//! use msgexport::adapters::elasticsearch::ElasticsearchEngine;
//! use msgexport::config::ElasticsearchConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ElasticsearchConfig {
//!     base_url: "https://es.example.com:9200".to_string(),
//!     ..Default::default()
//! };
//!
//! let engine = ElasticsearchEngine::new(config)?;
//! # Ok(())
//! # }
//! ```

pub mod elasticsearch;
pub mod engine;
pub mod index;
