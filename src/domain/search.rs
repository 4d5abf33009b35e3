//! Stored search definitions
//!
//! A [`Search`] holds one or more [`Query`] objects; each query owns a list of
//! [`SearchType`]s. These objects are read-only inputs to the export request
//! builder and are usually loaded from JSON.

use super::request::Sort;
use super::time_range::{DerivedTimeRange, TimeRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Stored search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Search {
    pub id: String,

    #[serde(default)]
    pub queries: Vec<Query>,

    /// Named values substituted into query strings as `$name$`
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Search {
    /// The query that owns the search type `search_type_id`
    pub fn query_for_search_type(&self, search_type_id: &str) -> Option<&Query> {
        self.queries
            .iter()
            .find(|q| q.search_type(search_type_id).is_some())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Stored query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: String,

    pub timerange: TimeRange,

    /// Free-text filter
    #[serde(default)]
    pub query: Option<String>,

    /// Streams the query is filtered to
    #[serde(default)]
    pub streams: BTreeSet<String>,

    #[serde(default)]
    pub search_types: Vec<SearchType>,
}

impl Query {
    pub fn search_type(&self, id: &str) -> Option<&SearchType> {
        self.search_types.iter().find(|st| st.id() == id)
    }

    /// Every stream id referenced by the query or any of its search types
    pub fn used_stream_ids(&self) -> BTreeSet<String> {
        self.search_types
            .iter()
            .flat_map(|st| st.streams().iter())
            .chain(self.streams.iter())
            .cloned()
            .collect()
    }
}

/// Named analytical unit of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchType {
    Messages(MessageList),
    Pivot(OtherSearchType),
    Events(OtherSearchType),
}

impl SearchType {
    pub fn id(&self) -> &str {
        match self {
            SearchType::Messages(ml) => &ml.id,
            SearchType::Pivot(other) | SearchType::Events(other) => &other.id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SearchType::Messages(_) => "messages",
            SearchType::Pivot(_) => "pivot",
            SearchType::Events(_) => "events",
        }
    }

    pub fn streams(&self) -> &BTreeSet<String> {
        match self {
            SearchType::Messages(ml) => &ml.streams,
            SearchType::Pivot(other) | SearchType::Events(other) => &other.streams,
        }
    }

    pub fn as_message_list(&self) -> Option<&MessageList> {
        match self {
            SearchType::Messages(ml) => Some(ml),
            _ => None,
        }
    }
}

/// Message list search type, the only exportable one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    pub id: String,

    #[serde(default)]
    pub timerange: Option<DerivedTimeRange>,

    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub streams: BTreeSet<String>,

    #[serde(default)]
    pub sort: Vec<Sort>,

    #[serde(default)]
    pub decorators: Vec<DecoratorConfig>,
}

impl MessageList {
    /// Stream restriction of this message list; empty means none
    pub fn effective_streams(&self) -> &BTreeSet<String> {
        &self.streams
    }
}

/// Search types that can't be exported but still reference streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherSearchType {
    pub id: String,

    #[serde(default)]
    pub streams: BTreeSet<String>,
}

/// Search parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Bound value
    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default)]
    pub default_value: Option<Value>,
}

impl Parameter {
    /// Bound value, falling back to the default
    pub fn effective_value(&self) -> Option<&Value> {
        self.value.as_ref().or(self.default_value.as_ref())
    }
}

/// Post-processing step attached to a message list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratorConfig {
    #[serde(default)]
    pub id: Option<String>,

    /// Application order, lowest first
    #[serde(default)]
    pub order: i32,

    #[serde(flatten)]
    pub kind: DecoratorKind,
}

/// Supported decorators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecoratorKind {
    /// Renders `${field}` placeholders into `target_field`
    FormatString {
        target_field: String,
        format: String,
        #[serde(default)]
        require_all_fields: bool,
    },
    /// Maps a numeric syslog level to its name
    SyslogSeverity {
        source_field: String,
        target_field: String,
    },
    /// Moves a field to a new name
    FieldRename { from: String, to: String },
}
