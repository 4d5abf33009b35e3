//! Chunk sinks
//!
//! The backend hands every chunk to a [`ChunkSink`] before fetching the next
//! page. An error returned from the sink aborts the run.

use crate::domain::{ExportError, Result, SimpleMessageChunk};
use std::io::Write;
use tokio::sync::watch;

/// Consumer of exported chunks
pub trait ChunkSink: Send {
    /// Takes ownership of one chunk
    ///
    /// # Errors
    ///
    /// Any error stops the export and is returned to the caller of the run.
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()>;
}

impl<F> ChunkSink for F
where
    F: FnMut(SimpleMessageChunk) -> Result<()> + Send,
{
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()> {
        self(chunk)
    }
}

/// Collects every chunk in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub chunks: Vec<SimpleMessageChunk>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.chunks.iter().map(SimpleMessageChunk::len).sum()
    }
}

impl ChunkSink for CollectingSink {
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()> {
        self.chunks.push(chunk);
        Ok(())
    }
}

/// Writes messages as newline-delimited JSON
///
/// Each line holds exactly the chunk's fields, in the chunk's field order;
/// missing fields are written as `null`.
///
/// ```
/// use msgexport::core::export::{ChunkSink, NdjsonChunkWriter};
/// use msgexport::domain::{SimpleMessage, SimpleMessageChunk};
/// use serde_json::{json, Map};
///
/// let mut fields = Map::new();
/// fields.insert("message".to_string(), json!("Ha"));
/// fields.insert("source".to_string(), json!("source-1"));
/// let chunk = SimpleMessageChunk::new(
///     vec!["source".to_string(), "message".to_string()],
///     vec![SimpleMessage::new("graylog_0", fields)],
///     true,
/// );
///
/// let mut writer = NdjsonChunkWriter::new(Vec::new());
/// writer.accept(chunk).unwrap();
///
/// let out = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(out, "{\"source\":\"source-1\",\"message\":\"Ha\"}\n");
/// ```
pub struct NdjsonChunkWriter<W: Write + Send> {
    writer: W,
    messages_written: u64,
}

impl<W: Write + Send> NdjsonChunkWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            messages_written: 0,
        }
    }

    pub fn messages_written(&self) -> u64 {
        self.messages_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ChunkSink for NdjsonChunkWriter<W> {
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()> {
        for message in chunk.messages() {
            let row = message.ordered_row(chunk.fields_in_order());
            serde_json::to_writer(&mut self.writer, &row)
                .map_err(|e| ExportError::Sink(format!("Failed to write message: {e}")))?;
            self.writer
                .write_all(b"\n")
                .map_err(|e| ExportError::Sink(format!("Failed to write message: {e}")))?;
            self.messages_written += 1;
        }
        self.writer
            .flush()
            .map_err(|e| ExportError::Sink(format!("Failed to flush output: {e}")))
    }
}

/// Sink wrapper that refuses further chunks once shutdown was requested
pub struct InterruptibleSink<'a> {
    inner: &'a mut dyn ChunkSink,
    shutdown: watch::Receiver<bool>,
    accepted: usize,
}

impl<'a> InterruptibleSink<'a> {
    pub fn new(inner: &'a mut dyn ChunkSink, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            inner,
            shutdown,
            accepted: 0,
        }
    }
}

impl ChunkSink for InterruptibleSink<'_> {
    fn accept(&mut self, chunk: SimpleMessageChunk) -> Result<()> {
        if *self.shutdown.borrow() {
            tracing::warn!(chunks = self.accepted, "Shutdown requested, stopping export");
            return Err(ExportError::Interrupted {
                chunks: self.accepted,
            });
        }
        self.inner.accept(chunk)?;
        self.accepted += 1;
        Ok(())
    }
}
