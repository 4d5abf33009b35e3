//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Why a run stopped fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back shorter than the chunk size
    Exhausted,
    /// The delivered count reached the request limit
    LimitReached,
    /// The index resolver found nothing to search
    NoIndices,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::Exhausted => "exhausted",
            StopReason::LimitReached => "limit_reached",
            StopReason::NoIndices => "no_indices",
        };
        f.write_str(reason)
    }
}

/// Summary of one export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Correlation id, also recorded on the run's tracing span
    pub export_id: Uuid,

    /// Chunks handed to the sink
    pub chunks_delivered: usize,

    /// Messages handed to the sink
    pub messages_delivered: u64,

    /// Page queries sent to the engine
    pub pages_fetched: usize,

    /// Number of indices searched
    pub indices_searched: usize,

    /// Set once the run finished normally
    pub stop_reason: Option<StopReason>,

    /// Duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(export_id: Uuid) -> Self {
        Self {
            export_id,
            chunks_delivered: 0,
            messages_delivered: 0,
            pages_fetched: 0,
            indices_searched: 0,
            stop_reason: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = Some(reason);
        self
    }

    /// Records a chunk of `messages` handed to the sink
    pub fn record_chunk(&mut self, messages: usize) {
        self.chunks_delivered += 1;
        self.messages_delivered += messages as u64;
    }

    /// Messages per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.messages_delivered as f64 / secs
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            export_id = %self.export_id,
            chunks = self.chunks_delivered,
            messages = self.messages_delivered,
            pages = self.pages_fetched,
            indices = self.indices_searched,
            stop_reason = self.stop_reason.map(|r| r.to_string()).unwrap_or_default(),
            duration_ms = self.duration.as_millis() as u64,
            throughput = format!("{:.1}/s", self.throughput()),
            "Export summary"
        );
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}
