//! Elasticsearch integration
//!
//! [`ElasticsearchEngine`] executes the export backend's page queries through
//! the `_search` REST API.

pub mod client;
pub mod models;

pub use client::ElasticsearchEngine;
