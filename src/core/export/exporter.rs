//! Export orchestrator
//!
//! [`MessagesExporter`] is the public entry point. It either passes a ready
//! request straight to the backend, or builds one from a stored search and
//! routes the chunks through the message list's decorators on the way to
//! the caller's sink.

use super::backend::{BackendConfig, ExportBackend, PaginatedExportBackend};
use super::builder::ExportRequestBuilder;
use super::sink::ChunkSink;
use super::summary::ExportSummary;
use crate::adapters::elasticsearch::ElasticsearchEngine;
use crate::adapters::index::create_index_resolver;
use crate::config::MsgExportConfig;
use crate::core::decorate::{
    ChunkDecorator, ConfiguredChunkDecorator, ParameterQueryStringDecorator,
};
use crate::domain::{
    DecoratorConfig, MessagesRequest, Result, ResultFormat, Search, SimpleMessageChunk,
};
use chrono::Utc;
use std::sync::Arc;

/// Wires request building, decoration and the export backend together
#[derive(Clone)]
pub struct MessagesExporter {
    backend: Arc<dyn ExportBackend>,
    request_builder: ExportRequestBuilder,
    chunk_decorator: Arc<dyn ChunkDecorator>,
}

impl MessagesExporter {
    pub fn new(
        backend: Arc<dyn ExportBackend>,
        request_builder: ExportRequestBuilder,
        chunk_decorator: Arc<dyn ChunkDecorator>,
    ) -> Self {
        Self {
            backend,
            request_builder,
            chunk_decorator,
        }
    }

    /// Wires an Elasticsearch backend and the built-in decorators from
    /// configuration
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Configuration` if the engine client can't be
    /// created.
    pub fn from_config(config: &MsgExportConfig) -> Result<Self> {
        let engine = ElasticsearchEngine::new(config.elasticsearch.clone())?;
        let backend = PaginatedExportBackend::new(
            Arc::new(engine),
            create_index_resolver(&config.indices),
            BackendConfig {
                allow_leading_wildcard: config.elasticsearch.allow_leading_wildcard_searches,
            },
        );
        let query_string_decorator = Arc::new(ParameterQueryStringDecorator::new()?);
        let request_builder = ExportRequestBuilder::new(query_string_decorator)
            .with_chunk_size(config.export.chunk_size);

        Ok(Self::new(
            Arc::new(backend),
            request_builder,
            Arc::new(ConfiguredChunkDecorator::new()?),
        ))
    }

    /// Exports a ready-made request
    pub async fn export(
        &self,
        request: &MessagesRequest,
        sink: &mut dyn ChunkSink,
    ) -> Result<ExportSummary> {
        self.backend.run(request, sink).await
    }

    /// Exports the message list `search_type_id` of `search`
    ///
    /// Request building failures are returned before the backend is
    /// contacted.
    pub async fn export_search(
        &self,
        search: &Search,
        search_type_id: Option<&str>,
        result_format: &ResultFormat,
        sink: &mut dyn ChunkSink,
    ) -> Result<ExportSummary> {
        let resolved =
            self.request_builder
                .resolve(search, search_type_id, result_format, Utc::now())?;

        match resolved.message_list {
            Some(message_list) => {
                let mut decorating = DecoratingSink {
                    inner: sink,
                    decorator: self.chunk_decorator.as_ref(),
                    decorators: &message_list.decorators,
                    request: &resolved.request,
                };
                self.backend.run(&resolved.request, &mut decorating).await
            }
            None => self.backend.run(&resolved.request, sink).await,
        }
    }
}

/// Decorates each chunk before forwarding it
struct DecoratingSink<'a> {
    inner: &'a mut dyn ChunkSink,
    decorator: &'a dyn ChunkDecorator,
    decorators: &'a [DecoratorConfig],
    request: &'a MessagesRequest,
}

impl ChunkSink for DecoratingSink<'_> {
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()> {
        // decorators only touch message contents
        let shell = SimpleMessageChunk::new(
            chunk.fields_in_order().to_vec(),
            Vec::new(),
            chunk.is_first_chunk(),
        );

        let decorated = self
            .decorator
            .decorate(chunk, self.decorators, self.request)?;
        let decorated = shell.with_messages(decorated.into_messages());

        self.inner.accept(decorated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decorate::{ConfiguredChunkDecorator, NoopQueryStringDecorator};
    use crate::core::export::sink::CollectingSink;
    use crate::domain::{ExportError, SimpleMessage};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    /// Backend that records requests and emits one fixed chunk
    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<MessagesRequest>>,
    }

    #[async_trait]
    impl ExportBackend for RecordingBackend {
        async fn run(
            &self,
            request: &MessagesRequest,
            sink: &mut dyn ChunkSink,
        ) -> Result<ExportSummary> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }

            let mut fields = Map::new();
            fields.insert("message".to_string(), json!("Ha"));
            fields.insert("level".to_string(), json!(3));
            let chunk = SimpleMessageChunk::new(
                request.fields_in_order().to_vec(),
                vec![SimpleMessage::new("graylog_0", fields)],
                true,
            );
            sink.accept(chunk)?;

            let mut summary = ExportSummary::default();
            summary.record_chunk(1);
            Ok(summary)
        }
    }

    fn exporter(backend: Arc<RecordingBackend>) -> MessagesExporter {
        MessagesExporter::new(
            backend,
            ExportRequestBuilder::new(Arc::new(NoopQueryStringDecorator)),
            Arc::new(ConfiguredChunkDecorator::new().unwrap()),
        )
    }

    fn search() -> Search {
        serde_json::from_value(json!({
            "id": "search-1",
            "queries": [{
                "id": "query-1",
                "timerange": {"type": "relative", "range": 300},
                "search_types": [{
                    "type": "messages",
                    "id": "ml-1",
                    "decorators": [{
                        "type": "syslog_severity",
                        "source_field": "level",
                        "target_field": "level_name"
                    }]
                }]
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_export_search_decorates_chunks() {
        let backend = Arc::new(RecordingBackend::default());
        let mut sink = CollectingSink::new();

        let summary = exporter(backend.clone())
            .export_search(&search(), Some("ml-1"), &ResultFormat::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.messages_delivered, 1);
        let chunk = &sink.chunks[0];
        assert!(chunk.is_first_chunk());
        assert_eq!(chunk.fields_in_order(), ["timestamp", "source", "message"]);
        assert_eq!(chunk.messages()[0].get("level_name"), Some(&Value::from("Error")));
    }

    #[tokio::test]
    async fn test_export_search_without_search_type_passes_chunks_through() {
        let backend = Arc::new(RecordingBackend::default());
        let mut sink = CollectingSink::new();

        exporter(backend.clone())
            .export_search(&search(), None, &ResultFormat::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.chunks[0].messages()[0].get("level_name"), None);
    }

    #[tokio::test]
    async fn test_build_failure_never_reaches_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let mut sink = CollectingSink::new();

        let err = exporter(backend.clone())
            .export_search(&search(), Some("missing"), &ResultFormat::default(), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Configuration(_)));
        assert!(backend.requests.lock().unwrap().is_empty());
        assert!(sink.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_export_passes_request_through() {
        let backend = Arc::new(RecordingBackend::default());
        let mut sink = CollectingSink::new();
        let request = MessagesRequest::builder(crate::domain::TimeRange::relative(60))
            .limit(7)
            .build()
            .unwrap();

        exporter(backend.clone()).export(&request, &mut sink).await.unwrap();

        assert_eq!(backend.requests.lock().unwrap()[0], request);
    }

    #[test]
    fn test_from_config_rejects_bad_engine_url() {
        let mut config = MsgExportConfig::default();
        config.elasticsearch.base_url = "not a url".to_string();

        let err = MessagesExporter::from_config(&config).err().unwrap();
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_from_config_with_defaults() {
        assert!(MessagesExporter::from_config(&MsgExportConfig::default()).is_ok());
    }
}
