//! Shared fixtures for integration tests
//!
//! [`InMemoryEngine`] evaluates [`EngineQuery`] values against a fixed set of
//! documents: index, time, stream and free-text filters, multi-key sort,
//! `search_after` and source projection.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use msgexport::adapters::engine::{EngineHit, EngineQuery, SearchEngine, SearchPage};
use msgexport::adapters::index::{IndexRange, IndexRangeResolver, IndexResolver};
use msgexport::core::export::{BackendConfig, PaginatedExportBackend};
use msgexport::domain::{EngineError, SortOrder};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

pub const DAY: &str = "2015-01-01";

/// One stored document
#[derive(Debug, Clone)]
pub struct Document {
    pub index: String,
    pub id: String,
    pub source: Map<String, Value>,
}

impl Document {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.source
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|ts| ts.parse().ok())
    }

    fn streams(&self) -> Vec<&str> {
        self.source
            .get("streams")
            .and_then(Value::as_array)
            .map(|s| s.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn matches(&self, query_string: &str) -> bool {
        let terms: Vec<&str> = query_string
            .split_whitespace()
            .filter(|t| *t != "OR")
            .collect();
        if terms.is_empty() || terms == ["*"] {
            return true;
        }

        // any term matches (OR semantics)
        terms.iter().any(|term| match term.split_once(':') {
            Some((field, value)) => self.source.get(field).and_then(Value::as_str) == Some(value),
            None => self
                .source
                .get("message")
                .and_then(Value::as_str)
                .is_some_and(|m| m.split_whitespace().any(|w| w == *term)),
        })
    }
}

/// Message documents of the fixture day, two per stream
pub fn fixture_documents() -> Vec<Document> {
    vec![
        document("graylog_0", 1, "01:00", "source-1", "Ha", "stream-01"),
        document("graylog_1", 2, "02:00", "source-2", "He", "stream-02"),
        document("graylog_0", 3, "03:00", "source-1", "Hi", "stream-01"),
        document("graylog_0", 4, "04:00", "source-2", "Ho", "stream-02"),
    ]
}

fn document(index: &str, n: u32, time: &str, source: &str, message: &str, stream: &str) -> Document {
    let value = json!({
        "timestamp": format!("{DAY}T{time}:00.000Z"),
        "source": source,
        "message": message,
        "gl2_message_id": format!("msg-{n:02}"),
        "streams": [stream],
    });
    Document {
        index: index.to_string(),
        id: format!("doc-{n}"),
        source: match value {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

/// Search engine over in-memory documents, recording every query
#[derive(Default)]
pub struct InMemoryEngine {
    documents: Vec<Document>,
    pub queries: Mutex<Vec<EngineQuery>>,
    fail_on_page: Option<usize>,
}

impl InMemoryEngine {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
            fail_on_page: None,
        }
    }

    pub fn fixture() -> Self {
        Self::new(fixture_documents())
    }

    /// Fixture engine whose `page`-th search (1-based) fails
    pub fn failing_on_page(page: usize) -> Self {
        Self {
            fail_on_page: Some(page),
            ..Self::fixture()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    async fn search(&self, query: &EngineQuery) -> Result<SearchPage, EngineError> {
        let page = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.clone());
            queries.len()
        };
        if self.fail_on_page == Some(page) {
            return Err(EngineError::Execution(format!(
                "shard failure on page {page}"
            )));
        }

        let mut matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| query.indices.contains(&d.index))
            .filter(|d| d.timestamp().is_some_and(|ts| query.time_range.contains(ts)))
            .filter(|d| {
                query.streams.is_empty()
                    || d.streams().iter().any(|s| query.streams.contains(*s))
            })
            .filter(|d| d.matches(&query.query_string))
            .collect();

        matching.sort_by(|a, b| compare_documents(a, b, query));

        let hits = matching
            .into_iter()
            .filter(|d| match &query.search_after {
                Some(cursor) => compare_to_cursor(d, cursor, query) == Ordering::Greater,
                None => true,
            })
            .take(query.size)
            .map(|d| EngineHit {
                index: d.index.clone(),
                id: d.id.clone(),
                source: d
                    .source
                    .iter()
                    .filter(|(k, _)| query.source_fields.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                sort_values: sort_values(d, query),
            })
            .collect();

        Ok(SearchPage::new(hits))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn sort_values(document: &Document, query: &EngineQuery) -> Vec<Value> {
    query
        .sort
        .iter()
        .map(|s| document.source.get(&s.field).cloned().unwrap_or(Value::Null))
        .collect()
}

fn compare_documents(a: &Document, b: &Document, query: &EngineQuery) -> Ordering {
    compare_keys(&sort_values(a, query), &sort_values(b, query), query)
}

fn compare_to_cursor(document: &Document, cursor: &[Value], query: &EngineQuery) -> Ordering {
    compare_keys(&sort_values(document, query), cursor, query)
}

fn compare_keys(a: &[Value], b: &[Value], query: &EngineQuery) -> Ordering {
    for ((x, y), sort) in a.iter().zip(b).zip(&query.sort) {
        let ordering = compare_values(x, y);
        let ordering = match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Index ranges covering the fixture day
pub fn fixture_resolver() -> Arc<dyn IndexResolver> {
    let day = |time: &str| format!("{DAY}T{time}Z").parse::<DateTime<Utc>>().unwrap();
    Arc::new(IndexRangeResolver::new(vec![
        IndexRange {
            index_name: "graylog_0".to_string(),
            begin: day("00:00:00"),
            end: day("23:59:59"),
            streams: ["stream-01", "stream-02"].into_iter().map(String::from).collect(),
        },
        IndexRange {
            index_name: "graylog_1".to_string(),
            begin: day("00:00:00"),
            end: day("23:59:59"),
            streams: ["stream-02"].into_iter().map(String::from).collect(),
        },
    ]))
}

pub fn backend(engine: Arc<InMemoryEngine>) -> PaginatedExportBackend {
    PaginatedExportBackend::new(engine, fixture_resolver(), BackendConfig::default())
}

/// `field` of every delivered message, in delivery order
pub fn column(messages: &[msgexport::domain::SimpleMessage], field: &str) -> Vec<String> {
    messages
        .iter()
        .map(|m| m.get(field).and_then(Value::as_str).unwrap_or_default().to_string())
        .collect()
}
