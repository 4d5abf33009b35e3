//! Query string decoration
//!
//! Rewrites the free-text query of a stored search before it is put into the
//! export request.

use crate::domain::{ExportError, Query, Result, Search};
use regex::{Captures, Regex};
use serde_json::Value;

/// Rewrites a raw query string
pub trait QueryStringDecorator: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExportError::Configuration` if the query can't be completed
    /// from the search definition.
    fn decorate(&self, query_string: &str, search: &Search, query: &Query) -> Result<String>;
}

/// Leaves query strings untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueryStringDecorator;

impl QueryStringDecorator for NoopQueryStringDecorator {
    fn decorate(&self, query_string: &str, _search: &Search, _query: &Query) -> Result<String> {
        Ok(query_string.to_string())
    }
}

/// Substitutes `$name$` tokens with search parameter values
///
/// Only tokens naming a declared parameter are replaced; anything else is
/// left as written. Array values are joined with ` OR `.
///
/// ```
/// use msgexport::core::decorate::{ParameterQueryStringDecorator, QueryStringDecorator};
/// use msgexport::domain::Search;
/// use serde_json::json;
///
/// let search: Search = serde_json::from_value(json!({
///     "id": "s",
///     "queries": [{"id": "q", "timerange": {"type": "relative", "range": 300}}],
///     "parameters": [{"name": "host", "value": "web-01"}]
/// })).unwrap();
///
/// let decorator = ParameterQueryStringDecorator::new().unwrap();
/// let query = decorator.decorate("source:$host$", &search, &search.queries[0]).unwrap();
/// assert_eq!(query, "source:web-01");
/// ```
#[derive(Debug, Clone)]
pub struct ParameterQueryStringDecorator {
    token: Regex,
}

impl ParameterQueryStringDecorator {
    pub fn new() -> Result<Self> {
        let token = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\$").map_err(|e| {
            ExportError::Configuration(format!("Invalid parameter token pattern: {e}"))
        })?;
        Ok(Self { token })
    }
}

impl QueryStringDecorator for ParameterQueryStringDecorator {
    fn decorate(&self, query_string: &str, search: &Search, _query: &Query) -> Result<String> {
        let mut unbound = Vec::new();

        let decorated = self.token.replace_all(query_string, |caps: &Captures| {
            let name = &caps[1];
            match search.parameter(name) {
                None => caps[0].to_string(),
                Some(parameter) => match parameter.effective_value() {
                    Some(value) => render_value(value),
                    None => {
                        unbound.push(name.to_string());
                        caps[0].to_string()
                    }
                },
            }
        });

        if !unbound.is_empty() {
            return Err(ExportError::Configuration(format!(
                "Unbound query parameter(s) in search {}: {}",
                search.id,
                unbound.join(", ")
            )));
        }

        Ok(decorated.into_owned())
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" OR "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
