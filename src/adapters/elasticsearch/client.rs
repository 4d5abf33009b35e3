//! Elasticsearch search engine client
//!
//! This module implements [`SearchEngine`] on top of the Elasticsearch
//! `_search` API using `search_after` pagination.

use super::models::{search_body, ErrorResponse, SearchResponse};
use crate::adapters::engine::{EngineQuery, SearchEngine, SearchPage};
use crate::config::ElasticsearchConfig;
use crate::domain::{EngineError, ExportError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

type EngineResult<T> = std::result::Result<T, EngineError>;

/// Elasticsearch client
///
/// # Example
///
/// ```no_run
/// use msgexport::adapters::elasticsearch::ElasticsearchEngine;
/// use msgexport::config::ElasticsearchConfig;
///
/// # fn example() -> msgexport::domain::Result<()> {
/// let config = ElasticsearchConfig::default();
/// let engine = ElasticsearchEngine::new(config)?;
/// # Ok(())
/// # }
/// ```
pub struct ElasticsearchEngine {
    /// Base URL of the cluster
    base_url: Url,

    /// HTTP client for making requests
    client: Client,

    /// Elasticsearch configuration
    config: ElasticsearchConfig,
}

impl ElasticsearchEngine {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Configuration` if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| {
            ExportError::Configuration(format!(
                "Invalid elasticsearch.base_url '{}': {e}",
                config.base_url
            ))
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            ExportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    /// Base URL of the cluster
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build authorization header value
    fn auth_header_value(&self) -> Option<String> {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret().as_ref());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        }
    }

    fn search_url(&self, query: &EngineQuery) -> EngineResult<Url> {
        let indices = query
            .indices
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self
            .base_url
            .join(&format!("{indices}/_search"))
            .map_err(|e| EngineError::Execution(format!("Invalid search URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("ignore_unavailable", "true")
            .append_pair("allow_no_indices", "true");

        Ok(url)
    }

    /// Retry a request with exponential backoff
    ///
    /// Only connection failures and 5xx responses are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> EngineResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = EngineResult<T>>,
    {
        let max_retries = self.config.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < max_retries => {
                    attempt += 1;

                    let delay_ms = (self.config.retry.initial_delay_ms as f64
                        * self
                            .config
                            .retry
                            .backoff_multiplier
                            .powi(attempt as i32 - 1)) as u64;
                    let delay_ms = delay_ms.min(self.config.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying search request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute(&self, url: &Url, body: &serde_json::Value) -> EngineResult<SearchPage> {
        let mut request = self.client.post(url.clone()).json(body);

        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Execution(format!("Search request timed out: {e}"))
            } else {
                EngineError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body));
        }

        let response = resp
            .json::<SearchResponse>()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(response.into())
    }
}

fn error_for_status(status: StatusCode, body: &str) -> EngineError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.describe())
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::BAD_REQUEST {
        EngineError::Query(message)
    } else if status.is_server_error() {
        EngineError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        EngineError::Execution(format!("Search failed with status {status}: {message}"))
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    async fn search(&self, query: &EngineQuery) -> EngineResult<SearchPage> {
        let url = self.search_url(query)?;
        let body = search_body(query);

        tracing::trace!(url = %url, body = %body, "Executing search request");

        self.retry_request(|| self.execute(&url, &body)).await
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}
