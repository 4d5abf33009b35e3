//! Paginated export backend
//!
//! Runs one [`MessagesRequest`] against a [`SearchEngine`]:
//!
//! 1. resolve the indices for the request's streams and time range (once)
//! 2. validate the query string
//! 3. fetch pages of `chunk_size` hits with `search_after` cursors, handing
//!    each page to the sink as one chunk before the next fetch
//!
//! Pages are never truncated. A run stops after a short page, or after the
//! first page that brings the delivered count to the limit.

use super::query::{build_engine_query, validate_query_string};
use super::sink::ChunkSink;
use super::summary::{ExportSummary, StopReason};
use crate::adapters::engine::{EngineHit, SearchEngine};
use crate::adapters::index::IndexResolver;
use crate::domain::message::FIELD_DOCUMENT_ID;
use crate::domain::{MessagesRequest, Result, SimpleMessage, SimpleMessageChunk};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Executes export requests
#[async_trait]
pub trait ExportBackend: Send + Sync {
    /// Streams every chunk of `request` into `sink`
    ///
    /// # Errors
    ///
    /// Engine failures are returned as `ExportError::Engine`; sink errors are
    /// returned unchanged. Chunks delivered before a failure stay delivered.
    async fn run(&self, request: &MessagesRequest, sink: &mut dyn ChunkSink)
        -> Result<ExportSummary>;
}

/// Backend settings
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Accept query terms starting with a wildcard
    pub allow_leading_wildcard: bool,
}

/// What to do after a page was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageOutcome {
    Continue,
    Stop(StopReason),
}

/// Chunk and limit bookkeeping of one run
#[derive(Debug)]
pub(crate) struct Pagination {
    chunk_size: usize,
    limit: Option<u64>,
    delivered: u64,
    pages: usize,
}

impl Pagination {
    pub(crate) fn new(chunk_size: usize, limit: Option<u64>) -> Self {
        Self {
            chunk_size,
            limit,
            delivered: 0,
            pages: 0,
        }
    }

    /// True until the first non-empty page was delivered
    pub(crate) fn is_first_chunk(&self) -> bool {
        self.delivered == 0
    }

    pub(crate) fn record_page(&mut self, hits: usize) -> PageOutcome {
        self.pages += 1;
        self.delivered += hits as u64;

        if self.limit.is_some_and(|limit| self.delivered >= limit) {
            PageOutcome::Stop(StopReason::LimitReached)
        } else if hits < self.chunk_size {
            PageOutcome::Stop(StopReason::Exhausted)
        } else {
            PageOutcome::Continue
        }
    }

    pub(crate) fn pages(&self) -> usize {
        self.pages
    }
}

/// [`ExportBackend`] paginating with `search_after`
pub struct PaginatedExportBackend {
    engine: Arc<dyn SearchEngine>,
    index_resolver: Arc<dyn IndexResolver>,
    config: BackendConfig,
}

impl PaginatedExportBackend {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        index_resolver: Arc<dyn IndexResolver>,
        config: BackendConfig,
    ) -> Self {
        Self {
            engine,
            index_resolver,
            config,
        }
    }

    async fn run_export(
        &self,
        export_id: Uuid,
        request: &MessagesRequest,
        sink: &mut dyn ChunkSink,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new(export_id);

        let time_range = request.time_range().to_absolute(Utc::now())?;
        validate_query_string(request.query_string(), self.config.allow_leading_wildcard)?;

        let indices = self
            .index_resolver
            .resolve(request.streams(), &time_range)
            .await?;
        summary.indices_searched = indices.len();

        if indices.is_empty() {
            tracing::info!(time_range = %time_range, "No indices to search");
            return Ok(summary
                .with_stop_reason(StopReason::NoIndices)
                .with_duration(start_time.elapsed()));
        }

        crate::log_export_start!(
            self.engine.name(),
            indices.len(),
            request.chunk_size(),
            request.limit()
        );

        let mut query = build_engine_query(
            request,
            indices,
            time_range,
            self.config.allow_leading_wildcard,
        );
        let mut pagination = Pagination::new(request.chunk_size(), request.limit());

        let stop_reason = loop {
            let page = self.engine.search(&query).await?;
            let hits = page.len();
            let cursor = page.cursor();

            if hits == 0 {
                summary.pages_fetched = pagination.pages() + 1;
                break StopReason::Exhausted;
            }

            let chunk = SimpleMessageChunk::new(
                request.fields_in_order().to_vec(),
                page.hits.into_iter().map(to_message).collect(),
                pagination.is_first_chunk(),
            );
            sink.accept(chunk)?;

            let outcome = pagination.record_page(hits);
            summary.record_chunk(hits);
            summary.pages_fetched = pagination.pages();

            crate::log_page_fetched!(pagination.pages(), hits, summary.messages_delivered);

            match (outcome, cursor) {
                (PageOutcome::Stop(reason), _) => break reason,
                (PageOutcome::Continue, Some(cursor)) => query = query.continue_after(cursor),
                (PageOutcome::Continue, None) => break StopReason::Exhausted,
            }
        };

        let summary = summary
            .with_stop_reason(stop_reason)
            .with_duration(start_time.elapsed());

        crate::log_export_complete!(summary.messages_delivered, summary.duration);

        Ok(summary)
    }
}

#[async_trait]
impl ExportBackend for PaginatedExportBackend {
    async fn run(
        &self,
        request: &MessagesRequest,
        sink: &mut dyn ChunkSink,
    ) -> Result<ExportSummary> {
        let export_id = Uuid::new_v4();
        let span = tracing::info_span!("export", export_id = %export_id);

        let result = self
            .run_export(export_id, request, sink)
            .instrument(span.clone())
            .await;

        if let Err(e) = &result {
            span.in_scope(|| {
                crate::log_error_with_context!(e, "Export run failed");
            });
        }

        result
    }
}

/// Raw hit to message; the document id becomes the `_id` field
fn to_message(hit: EngineHit) -> SimpleMessage {
    let mut fields = hit.source;
    fields.insert(FIELD_DOCUMENT_ID.to_string(), Value::String(hit.id));
    SimpleMessage::new(hit.index, fields)
}
