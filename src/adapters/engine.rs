//! Search engine abstraction
//!
//! This module defines the trait that search engine clients must implement to
//! serve the export backend, plus the engine-neutral query and page types.

use crate::domain::{AbsoluteRange, EngineError, Sort};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One page request against the engine
///
/// The query is fully resolved: concrete indices, an absolute time range and
/// the complete sort including the tie-breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineQuery {
    /// Indices to search
    pub indices: BTreeSet<String>,

    /// Half-open timestamp filter
    pub time_range: AbsoluteRange,

    /// Free-text query; empty matches everything
    pub query_string: String,

    /// Stream membership filter; empty means no stream filter
    pub streams: BTreeSet<String>,

    /// Source fields to return
    pub source_fields: Vec<String>,

    /// Sort keys, tie-breaker last
    pub sort: Vec<Sort>,

    /// Page size
    pub size: usize,

    /// Sort values of the last hit of the previous page
    pub search_after: Option<Vec<Value>>,

    /// Pass-through for the engine's own leading wildcard switch
    pub allow_leading_wildcard: bool,
}

impl EngineQuery {
    /// Same query continuing after `cursor`
    pub fn continue_after(&self, cursor: Vec<Value>) -> Self {
        Self {
            search_after: Some(cursor),
            ..self.clone()
        }
    }
}

/// A raw document returned by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineHit {
    pub index: String,
    pub id: String,
    pub source: Map<String, Value>,
    /// Sort values of this hit, used as the continuation cursor
    pub sort_values: Vec<Value>,
}

/// Hits of one page, in engine order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<EngineHit>,
}

impl SearchPage {
    pub fn new(hits: Vec<EngineHit>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Continuation cursor for the next page
    pub fn cursor(&self) -> Option<Vec<Value>> {
        self.hits.last().map(|hit| hit.sort_values.clone())
    }
}

/// Trait for search engine clients
///
/// Implementations execute exactly the query they are given; pagination
/// policy lives in the export backend.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Executes one sorted, filtered, projected page query
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Query` if the engine rejects the query and a
    /// transport/execution error for everything else.
    async fn search(&self, query: &EngineQuery) -> std::result::Result<SearchPage, EngineError>;

    /// Short engine name used in log fields
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(id: &str, sort: Vec<Value>) -> EngineHit {
        EngineHit {
            index: "graylog_0".to_string(),
            id: id.to_string(),
            source: Map::new(),
            sort_values: sort,
        }
    }

    #[test]
    fn test_cursor_is_last_hit_sort_values() {
        let page = SearchPage::new(vec![
            hit("a", vec![json!(4), json!("a")]),
            hit("b", vec![json!(3), json!("b")]),
        ]);

        assert_eq!(page.cursor(), Some(vec![json!(3), json!("b")]));
        assert_eq!(SearchPage::default().cursor(), None);
    }

    #[test]
    fn test_continue_after_keeps_everything_else() {
        let query = EngineQuery {
            indices: ["graylog_0".to_string()].into_iter().collect(),
            time_range: AbsoluteRange::parse("2015-01-01T00:00:00Z", "2015-01-03T00:00:00Z")
                .unwrap(),
            query_string: "Ha".to_string(),
            streams: BTreeSet::new(),
            source_fields: vec!["message".to_string()],
            sort: vec![Sort::desc("timestamp")],
            size: 2,
            search_after: None,
            allow_leading_wildcard: false,
        };

        let next = query.continue_after(vec![json!(1)]);

        assert_eq!(next.search_after, Some(vec![json!(1)]));
        assert_eq!(next.size, 2);
        assert_eq!(next.query_string, "Ha");
    }
}
