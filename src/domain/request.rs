//! Export request types
//!
//! [`MessagesRequest`] is the single, immutable description of one export run.
//! It is created through [`MessagesRequestBuilder`], which validates the values
//! and applies defaults; there is no way to change a request after `build()`.

use super::message::{FIELD_MESSAGE, FIELD_SOURCE, FIELD_TIMESTAMP};
use super::time_range::TimeRange;
use super::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Page size used when a request doesn't set one
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Columns exported when a request doesn't list any
pub const DEFAULT_FIELDS: [&str; 3] = [FIELD_TIMESTAMP, FIELD_SOURCE, FIELD_MESSAGE];

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order '{other}'. Must be one of: asc, desc")),
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.order.as_str())
    }
}

/// Parses `field` or `field:asc|desc`; a bare field sorts ascending
impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (field, order) = match s.rsplit_once(':') {
            Some((field, order)) => (field.trim(), order.parse()?),
            None => (s, SortOrder::Asc),
        };
        if field.is_empty() {
            return Err(format!("Invalid sort '{s}': field name cannot be empty"));
        }
        Ok(Sort::new(field, order))
    }
}

/// User-declared export view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFormat {
    #[serde(default)]
    pub fields_in_order: Vec<String>,

    #[serde(default)]
    pub sort: Vec<Sort>,

    #[serde(default)]
    pub limit: Option<u64>,
}

/// Immutable description of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesRequest {
    time_range: TimeRange,
    streams: BTreeSet<String>,
    query_string: String,
    fields_in_order: Vec<String>,
    sort: Vec<Sort>,
    limit: Option<u64>,
    chunk_size: usize,
}

impl MessagesRequest {
    /// Starts a request over `time_range` with every other value defaulted
    pub fn builder(time_range: TimeRange) -> MessagesRequestBuilder {
        MessagesRequestBuilder::new(time_range)
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    /// Stream scope; empty means all streams
    pub fn streams(&self) -> &BTreeSet<String> {
        &self.streams
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn fields_in_order(&self) -> &[String] {
        &self.fields_in_order
    }

    /// Requested sort; empty means the engine's natural order
    pub fn sort(&self) -> &[Sort] {
        &self.sort
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Builder for [`MessagesRequest`]
///
/// # Example
///
/// ```
/// use msgexport::domain::{MessagesRequest, Sort, TimeRange};
///
/// let request = MessagesRequest::builder(TimeRange::relative(300))
///     .streams(["stream-01"])
///     .query_string("source:web-01")
///     .fields_in_order(["timestamp", "message"])
///     .sort(vec![Sort::desc("timestamp")])
///     .limit(500)
///     .chunk_size(100)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.chunk_size(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct MessagesRequestBuilder {
    time_range: TimeRange,
    streams: BTreeSet<String>,
    query_string: String,
    fields_in_order: Option<Vec<String>>,
    sort: Vec<Sort>,
    limit: Option<u64>,
    chunk_size: usize,
}

impl MessagesRequestBuilder {
    fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            streams: BTreeSet::new(),
            query_string: String::new(),
            fields_in_order: None,
            sort: Vec::new(),
            limit: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams = streams.into_iter().map(Into::into).collect();
        self
    }

    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    pub fn fields_in_order<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_in_order = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort(mut self, sort: Vec<Sort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn optional_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validates and freezes the request
    ///
    /// Duplicate fields and duplicate sort fields are dropped, keeping the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Validation` for a zero chunk size, a zero limit,
    /// an empty field name, or an explicitly empty field list.
    pub fn build(self) -> Result<MessagesRequest> {
        if self.chunk_size == 0 {
            return Err(ExportError::Validation("chunk_size must be > 0".to_string()));
        }

        if self.limit == Some(0) {
            return Err(ExportError::Validation("limit must be > 0 when set".to_string()));
        }

        let fields_in_order = match self.fields_in_order {
            Some(fields) => {
                if fields.is_empty() {
                    return Err(ExportError::Validation(
                        "fields_in_order cannot be empty".to_string(),
                    ));
                }
                dedup_in_order(fields, |f| f.clone())
            }
            None => DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        };

        if fields_in_order.iter().any(|f| f.trim().is_empty()) {
            return Err(ExportError::Validation(
                "field names cannot be empty".to_string(),
            ));
        }

        let streams = self
            .streams
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();

        Ok(MessagesRequest {
            time_range: self.time_range,
            streams,
            query_string: self.query_string.trim().to_string(),
            fields_in_order,
            sort: dedup_in_order(self.sort, |s| s.field.clone()),
            limit: self.limit,
            chunk_size: self.chunk_size,
        })
    }
}

fn dedup_in_order<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut seen = BTreeSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
