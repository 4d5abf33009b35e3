//! Export request builder
//!
//! Resolves one [`MessagesRequest`] from a stored [`Search`], an optional
//! search type id and a [`ResultFormat`].
//!
//! Precedence:
//!
//! | value        | source                                                        |
//! |--------------|---------------------------------------------------------------|
//! | time range   | message list override resolved against the query, else query |
//! | query string | query AND message list filters, then decorated               |
//! | streams      | message list streams, else every stream the query references |
//! | fields       | result format                                                 |
//! | sort         | result format, else message list                              |
//! | limit        | result format                                                 |

use crate::core::decorate::QueryStringDecorator;
use crate::domain::{
    ExportError, MessageList, MessagesRequest, Query, Result, ResultFormat, Search,
    DEFAULT_CHUNK_SIZE,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A built request plus the message list it was resolved from
#[derive(Debug, Clone)]
pub struct ResolvedExport {
    pub request: MessagesRequest,
    pub message_list: Option<MessageList>,
}

/// Builds export requests from stored searches
#[derive(Clone)]
pub struct ExportRequestBuilder {
    query_string_decorator: Arc<dyn QueryStringDecorator>,
    chunk_size: usize,
}

impl ExportRequestBuilder {
    pub fn new(query_string_decorator: Arc<dyn QueryStringDecorator>) -> Self {
        Self {
            query_string_decorator,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Page size for every request this builder produces
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Builds the request for `search`
    ///
    /// # Errors
    ///
    /// - `ExportError::Configuration` for a search without queries, a search
    ///   with several queries and no search type id, an unknown search type
    ///   id, or an unbound query parameter
    /// - `ExportError::UnsupportedSearchType` if the search type is not a
    ///   message list
    pub fn build_request(
        &self,
        search: &Search,
        search_type_id: Option<&str>,
        result_format: &ResultFormat,
        now: DateTime<Utc>,
    ) -> Result<MessagesRequest> {
        self.resolve(search, search_type_id, result_format, now)
            .map(|resolved| resolved.request)
    }

    /// Like [`build_request`](Self::build_request), also returning the
    /// message list that was used
    pub fn resolve(
        &self,
        search: &Search,
        search_type_id: Option<&str>,
        result_format: &ResultFormat,
        now: DateTime<Utc>,
    ) -> Result<ResolvedExport> {
        let query = select_query(search, search_type_id)?;
        let message_list = select_message_list(query, search_type_id)?;

        let time_range = match message_list.and_then(|ml| ml.timerange.as_ref()) {
            Some(derived) => derived.effective(&query.timerange, now)?,
            None => query.timerange.clone(),
        };

        let raw_query = concatenate_queries(
            query.query.as_deref(),
            message_list.and_then(|ml| ml.query.as_deref()),
        );
        let query_string = self
            .query_string_decorator
            .decorate(&raw_query, search, query)?;

        let streams = match message_list {
            Some(ml) if !ml.effective_streams().is_empty() => ml.effective_streams().clone(),
            _ => query.used_stream_ids(),
        };

        let sort = if !result_format.sort.is_empty() {
            result_format.sort.clone()
        } else {
            message_list.map(|ml| ml.sort.clone()).unwrap_or_default()
        };

        let mut builder = MessagesRequest::builder(time_range)
            .streams(streams)
            .query_string(query_string)
            .sort(sort)
            .optional_limit(result_format.limit)
            .chunk_size(self.chunk_size);

        if !result_format.fields_in_order.is_empty() {
            builder = builder.fields_in_order(result_format.fields_in_order.iter().cloned());
        }

        let request = builder.build()?;

        tracing::debug!(
            search_id = %search.id,
            query_id = %query.id,
            search_type_id = search_type_id.unwrap_or("-"),
            streams = request.streams().len(),
            query_string = %request.query_string(),
            "Built export request"
        );

        Ok(ResolvedExport {
            request,
            message_list: message_list.cloned(),
        })
    }
}

fn select_query<'a>(search: &'a Search, search_type_id: Option<&str>) -> Result<&'a Query> {
    if let Some(id) = search_type_id {
        return search.query_for_search_type(id).ok_or_else(|| {
            ExportError::Configuration(format!(
                "Search {} has no search type with id {id}",
                search.id
            ))
        });
    }

    match search.queries.as_slice() {
        [query] => Ok(query),
        [] => Err(ExportError::Configuration(format!(
            "Search {} has no queries",
            search.id
        ))),
        _ => Err(ExportError::Configuration(format!(
            "Search {} is ambiguous: it has {} queries and no search type was given",
            search.id,
            search.queries.len()
        ))),
    }
}

fn select_message_list<'a>(
    query: &'a Query,
    search_type_id: Option<&str>,
) -> Result<Option<&'a MessageList>> {
    let Some(search_type) = search_type_id.and_then(|id| query.search_type(id)) else {
        return Ok(None);
    };

    match search_type.as_message_list() {
        Some(ml) => Ok(Some(ml)),
        None => Err(ExportError::UnsupportedSearchType(format!(
            "{} ({}) is not a message list",
            search_type.id(),
            search_type.type_name()
        ))),
    }
}

/// `(a) AND (b)` when both filters are set, else whichever one is
fn concatenate_queries(query: Option<&str>, search_type_query: Option<&str>) -> String {
    fn non_blank(q: Option<&str>) -> Option<&str> {
        q.map(str::trim).filter(|q| !q.is_empty())
    }

    match (non_blank(query), non_blank(search_type_query)) {
        (Some(a), Some(b)) => format!("({a}) AND ({b})"),
        (Some(q), None) | (None, Some(q)) => q.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decorate::NoopQueryStringDecorator;
    use crate::domain::{DerivedTimeRange, SearchType, Sort, TimeRange};
    use serde_json::json;

    fn builder() -> ExportRequestBuilder {
        ExportRequestBuilder::new(Arc::new(NoopQueryStringDecorator)).with_chunk_size(2)
    }

    fn now() -> DateTime<Utc> {
        "2015-01-02T00:00:00Z".parse().unwrap()
    }

    fn search() -> Search {
        serde_json::from_value(json!({
            "id": "search-1",
            "queries": [{
                "id": "query-1",
                "timerange": {"type": "absolute", "from": "2015-01-01T00:00:00Z", "to": "2015-01-01T02:00:00Z"},
                "query": "source:source-1",
                "streams": ["stream-01"],
                "search_types": [
                    {
                        "type": "messages",
                        "id": "ml-1",
                        "query": "Ha OR Hi",
                        "sort": [{"field": "source", "order": "asc"}],
                        "timerange": {"type": "offset"}
                    },
                    {"type": "messages", "id": "ml-2", "streams": ["stream-02"]},
                    {"type": "pivot", "id": "pivot-1", "streams": ["stream-03"]}
                ]
            }]
        }))
        .unwrap()
    }

    fn two_query_search() -> Search {
        let mut s = search();
        let mut second = s.queries[0].clone();
        second.id = "query-2".to_string();
        second.search_types = vec![];
        s.queries.push(second);
        s
    }

    #[test]
    fn test_single_query_without_search_type_uses_query_scope() {
        let request = builder()
            .build_request(&search(), None, &ResultFormat::default(), now())
            .unwrap();

        assert_eq!(
            request.time_range(),
            &TimeRange::absolute(
                "2015-01-01T00:00:00Z".parse().unwrap(),
                "2015-01-01T02:00:00Z".parse().unwrap()
            )
            .unwrap()
        );
        assert_eq!(request.query_string(), "source:source-1");
        let streams: Vec<&str> = request.streams().iter().map(String::as_str).collect();
        assert_eq!(streams, vec!["stream-01", "stream-02", "stream-03"]);
        assert!(request.sort().is_empty());
        assert_eq!(request.chunk_size(), 2);
    }

    #[test]
    fn test_ambiguous_search_is_rejected() {
        let err = builder()
            .build_request(&two_query_search(), None, &ResultFormat::default(), now())
            .unwrap_err();

        assert!(matches!(err, ExportError::Configuration(ref m) if m.contains("ambiguous")));
    }

    #[test]
    fn test_search_type_id_selects_query_in_multi_query_search() {
        let request = builder()
            .build_request(&two_query_search(), Some("ml-2"), &ResultFormat::default(), now())
            .unwrap();

        let streams: Vec<&str> = request.streams().iter().map(String::as_str).collect();
        assert_eq!(streams, vec!["stream-02"]);
    }

    #[test]
    fn test_empty_search_is_rejected() {
        let mut s = search();
        s.queries.clear();

        let err = builder()
            .build_request(&s, None, &ResultFormat::default(), now())
            .unwrap_err();

        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_unknown_search_type_is_rejected() {
        let err = builder()
            .build_request(&search(), Some("nope"), &ResultFormat::default(), now())
            .unwrap_err();

        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_non_message_search_type_is_unsupported() {
        let err = builder()
            .build_request(&search(), Some("pivot-1"), &ResultFormat::default(), now())
            .unwrap_err();

        assert!(matches!(err, ExportError::UnsupportedSearchType(_)));
    }

    #[test]
    fn test_message_list_overrides() {
        let resolved = builder()
            .resolve(&search(), Some("ml-1"), &ResultFormat::default(), now())
            .unwrap();
        let request = resolved.request;

        assert_eq!(request.query_string(), "(source:source-1) AND (Ha OR Hi)");
        assert_eq!(request.sort(), [Sort::asc("source")]);
        // offset shifts the two hour query range back by its own length
        let range = request.time_range().to_absolute(now()).unwrap();
        assert_eq!(range.from(), "2014-12-31T22:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(range.to(), "2015-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        // no own streams: everything the query references
        assert_eq!(request.streams().len(), 3);
        assert_eq!(resolved.message_list.map(|ml| ml.id), Some("ml-1".to_string()));
    }

    #[test]
    fn test_offset_beyond_calendar_is_a_validation_error() {
        let mut search = search();
        if let SearchType::Messages(ml) = &mut search.queries[0].search_types[0] {
            ml.timerange = Some(DerivedTimeRange::Offset {
                intervals: 2_000_000_000,
            });
        }

        let err = builder()
            .build_request(&search, Some("ml-1"), &ResultFormat::default(), now())
            .unwrap_err();

        assert!(matches!(err, ExportError::Validation(_)));
    }

    #[test]
    fn test_result_format_wins_for_fields_sort_and_limit() {
        let format = ResultFormat {
            fields_in_order: vec!["message".to_string(), "timestamp".to_string()],
            sort: vec![Sort::desc("timestamp")],
            limit: Some(3),
        };

        let request = builder()
            .build_request(&search(), Some("ml-1"), &format, now())
            .unwrap();

        assert_eq!(request.fields_in_order(), ["message", "timestamp"]);
        assert_eq!(request.sort(), [Sort::desc("timestamp")]);
        assert_eq!(request.limit(), Some(3));
    }

    #[test]
    fn test_query_concatenation() {
        assert_eq!(concatenate_queries(Some("a"), Some("b")), "(a) AND (b)");
        assert_eq!(concatenate_queries(Some("a"), None), "a");
        assert_eq!(concatenate_queries(Some("  "), Some("b")), "b");
        assert_eq!(concatenate_queries(None, None), "");
    }
}
