//! Index resolution
//!
//! Maps a stream scope and a time range to the concrete indices the engine has
//! to search. The export backend calls the resolver once per run.

use crate::config::{IndexRangeConfig, IndicesConfig};
use crate::domain::{AbsoluteRange, EngineError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Trait for index lookups
#[async_trait]
pub trait IndexResolver: Send + Sync {
    /// Indices holding messages of `streams` within `time_range`
    ///
    /// An empty `streams` set means all streams.
    async fn resolve(
        &self,
        streams: &BTreeSet<String>,
        time_range: &AbsoluteRange,
    ) -> std::result::Result<BTreeSet<String>, EngineError>;
}

/// Time span and stream membership of one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRange {
    pub index_name: String,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Streams writing into this index; empty means every stream
    pub streams: BTreeSet<String>,
}

impl IndexRange {
    fn serves(&self, streams: &BTreeSet<String>) -> bool {
        self.streams.is_empty() || streams.is_empty() || !self.streams.is_disjoint(streams)
    }
}

impl From<&IndexRangeConfig> for IndexRange {
    fn from(config: &IndexRangeConfig) -> Self {
        Self {
            index_name: config.index_name.clone(),
            begin: config.begin,
            end: config.end,
            streams: config.streams.iter().cloned().collect(),
        }
    }
}

/// Resolver over a known list of index ranges
#[derive(Debug, Clone, Default)]
pub struct IndexRangeResolver {
    ranges: Vec<IndexRange>,
}

impl IndexRangeResolver {
    pub fn new(ranges: Vec<IndexRange>) -> Self {
        Self { ranges }
    }
}

#[async_trait]
impl IndexResolver for IndexRangeResolver {
    async fn resolve(
        &self,
        streams: &BTreeSet<String>,
        time_range: &AbsoluteRange,
    ) -> std::result::Result<BTreeSet<String>, EngineError> {
        let indices: BTreeSet<String> = self
            .ranges
            .iter()
            .filter(|range| time_range.overlaps(range.begin, range.end))
            .filter(|range| range.serves(streams))
            .map(|range| range.index_name.clone())
            .collect();

        tracing::debug!(
            stream_count = streams.len(),
            time_range = %time_range,
            index_count = indices.len(),
            "Resolved indices from index ranges"
        );

        Ok(indices)
    }
}

/// Resolver that always answers with the same index patterns
#[derive(Debug, Clone)]
pub struct PatternIndexResolver {
    patterns: BTreeSet<String>,
}

impl PatternIndexResolver {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl IndexResolver for PatternIndexResolver {
    async fn resolve(
        &self,
        _streams: &BTreeSet<String>,
        _time_range: &AbsoluteRange,
    ) -> std::result::Result<BTreeSet<String>, EngineError> {
        if self.patterns.is_empty() {
            return Err(EngineError::IndexResolution(
                "no index patterns configured".to_string(),
            ));
        }
        Ok(self.patterns.clone())
    }
}

/// Creates the resolver described by the `[indices]` configuration
///
/// Configured index ranges take precedence over the default patterns.
pub fn create_index_resolver(config: &IndicesConfig) -> Arc<dyn IndexResolver> {
    if config.ranges.is_empty() {
        tracing::debug!(patterns = ?config.default_patterns, "Using pattern index resolver");
        Arc::new(PatternIndexResolver::new(config.default_patterns.clone()))
    } else {
        tracing::debug!(range_count = config.ranges.len(), "Using index range resolver");
        Arc::new(IndexRangeResolver::new(
            config.ranges.iter().map(IndexRange::from).collect(),
        ))
    }
}
