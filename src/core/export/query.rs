//! Engine query construction
//!
//! Turns a [`MessagesRequest`] plus its resolved indices into the
//! [`EngineQuery`] for the first page.

use crate::adapters::engine::EngineQuery;
use crate::domain::message::{
    FIELD_MESSAGE, FIELD_MESSAGE_ID, FIELD_SOURCE, FIELD_STREAMS, FIELD_TIMESTAMP,
};
use crate::domain::{AbsoluteRange, EngineError, MessagesRequest, Sort};
use std::collections::BTreeSet;

/// Sort applied when the request has none: newest first
pub fn default_sort() -> Vec<Sort> {
    vec![Sort::desc(FIELD_TIMESTAMP)]
}

/// Request sort plus the message id tie-breaker
///
/// The tie-breaker makes `search_after` cursors unique even when the user's
/// sort keys are not.
pub fn effective_sort(requested: &[Sort]) -> Vec<Sort> {
    let mut sort = if requested.is_empty() {
        default_sort()
    } else {
        requested.to_vec()
    };

    if !sort.iter().any(|s| s.field == FIELD_MESSAGE_ID) {
        sort.push(Sort::asc(FIELD_MESSAGE_ID));
    }

    sort
}

/// Stored fields every exported message carries, requested or not
///
/// `_id` is not part of `_source`; it is copied from the hit.
pub const RESERVED_SOURCE_FIELDS: [&str; 5] = [
    FIELD_MESSAGE_ID,
    FIELD_SOURCE,
    FIELD_MESSAGE,
    FIELD_TIMESTAMP,
    FIELD_STREAMS,
];

/// Requested fields followed by the reserved fields not already listed
pub fn source_fields(fields_in_order: &[String]) -> Vec<String> {
    let mut fields = fields_in_order.to_vec();
    for reserved in RESERVED_SOURCE_FIELDS {
        if !fields.iter().any(|f| f == reserved) {
            fields.push(reserved.to_string());
        }
    }
    fields
}

/// Rejects query terms starting with `*` or `?` unless allowed
///
/// A lone `*` is a match-all and always accepted.
///
/// # Errors
///
/// Returns `EngineError::Query` naming the first offending term.
pub fn validate_query_string(
    query_string: &str,
    allow_leading_wildcard: bool,
) -> std::result::Result<(), EngineError> {
    if allow_leading_wildcard {
        return Ok(());
    }

    for token in query_string.split_whitespace() {
        let term = token.trim_start_matches(['+', '-', '!', '(']);
        let term = match term.split_once(':') {
            Some((_field, value)) => value.trim_start_matches('('),
            None => term,
        };

        if term == "*" {
            continue;
        }

        if term.starts_with('*') || term.starts_with('?') {
            return Err(EngineError::Query(format!(
                "Leading wildcard term '{token}' is not allowed in query string"
            )));
        }
    }

    Ok(())
}

/// First-page query for `request` over `indices`
pub fn build_engine_query(
    request: &MessagesRequest,
    indices: BTreeSet<String>,
    time_range: AbsoluteRange,
    allow_leading_wildcard: bool,
) -> EngineQuery {
    EngineQuery {
        indices,
        time_range,
        query_string: request.query_string().to_string(),
        streams: request.streams().clone(),
        source_fields: source_fields(request.fields_in_order()),
        sort: effective_sort(request.sort()),
        size: request.chunk_size(),
        search_after: None,
        allow_leading_wildcard,
    }
}
