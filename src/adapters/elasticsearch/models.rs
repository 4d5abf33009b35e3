//! Elasticsearch request/response models
//!
//! Only the parts of the search API the exporter uses are modelled.

use crate::adapters::engine::{EngineHit, EngineQuery, SearchPage};
use crate::domain::message::{FIELD_STREAMS, FIELD_TIMESTAMP};
use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Body of a `_search` call for one page
pub fn search_body(query: &EngineQuery) -> Value {
    let mut filters = vec![json!({
        "range": {
            FIELD_TIMESTAMP: {
                "gte": query.time_range.from().to_rfc3339_opts(SecondsFormat::Millis, true),
                "lt": query.time_range.to().to_rfc3339_opts(SecondsFormat::Millis, true),
                "format": "strict_date_optional_time",
            }
        }
    })];

    if !query.streams.is_empty() {
        filters.push(json!({ "terms": { FIELD_STREAMS: query.streams } }));
    }

    let must = if is_match_all(&query.query_string) {
        json!({ "match_all": {} })
    } else {
        json!({
            "query_string": {
                "query": query.query_string,
                "allow_leading_wildcard": query.allow_leading_wildcard,
            }
        })
    };

    let sort: Vec<Value> = query
        .sort
        .iter()
        .map(|s| json!({ s.field.as_str(): { "order": s.order.as_str() } }))
        .collect();

    let mut body = json!({
        "size": query.size,
        "track_total_hits": false,
        "_source": { "includes": query.source_fields },
        "sort": sort,
        "query": {
            "bool": {
                "filter": filters,
                "must": [must],
            }
        },
    });

    if let (Some(cursor), Some(map)) = (&query.search_after, body.as_object_mut()) {
        map.insert("search_after".to_string(), Value::Array(cursor.clone()));
    }

    body
}

fn is_match_all(query_string: &str) -> bool {
    let trimmed = query_string.trim();
    trimmed.is_empty() || trimmed == "*"
}

/// `_search` response
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_index")]
    pub index: String,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,

    #[serde(default)]
    pub sort: Vec<Value>,
}

impl From<SearchResponse> for SearchPage {
    fn from(response: SearchResponse) -> Self {
        SearchPage::new(
            response
                .hits
                .hits
                .into_iter()
                .map(|hit| EngineHit {
                    index: hit.index,
                    id: hit.id,
                    source: hit.source,
                    sort_values: hit.sort,
                })
                .collect(),
        )
    }
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Structured {
        #[serde(rename = "type")]
        error_type: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Plain(String),
}

impl ErrorDetail {
    pub fn describe(&self) -> String {
        match self {
            ErrorDetail::Structured {
                error_type,
                reason: Some(reason),
            } => format!("{error_type}: {reason}"),
            ErrorDetail::Structured { error_type, .. } => error_type.clone(),
            ErrorDetail::Plain(message) => message.clone(),
        }
    }
}
