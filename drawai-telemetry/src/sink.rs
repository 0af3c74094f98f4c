//! [`TraceSink`] implementations.

use async_trait::async_trait;
use drawai_core::{SpanOutcome, SpanRecord, TraceSink};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Re-emits every record as a `tracing` event on target `drawai::trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

#[async_trait]
impl TraceSink for LogTraceSink {
    async fn record(&self, span: SpanRecord) {
        let update = span.output_update.to_string();
        match span.outcome {
            SpanOutcome::Failed | SpanOutcome::Cancelled => tracing::warn!(
                target: "drawai::trace",
                run_id = %span.run_id,
                node = %span.node_name,
                step = span.step,
                input_digest = %span.input_digest,
                duration_ms = span.duration_ms,
                outcome = %span.outcome,
                update = %update,
                "node transition"
            ),
            _ => tracing::info!(
                target: "drawai::trace",
                run_id = %span.run_id,
                node = %span.node_name,
                step = span.step,
                input_digest = %span.input_digest,
                duration_ms = span.duration_ms,
                outcome = %span.outcome,
                update = %update,
                "node transition"
            ),
        }
    }

    async fn record_score(&self, run_id: &str, name: &str, value: f64) {
        tracing::info!(
            target: "drawai::trace",
            run_id = run_id,
            score_name = name,
            score_value = value,
            "score"
        );
    }
}

/// A named score recorded for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub name: String,
    pub value: f64,
}

/// Keeps records in memory, grouped by run id.
#[derive(Debug, Default, Clone)]
pub struct MemoryTraceSink {
    spans: Arc<RwLock<HashMap<String, Vec<SpanRecord>>>>,
    scores: Arc<RwLock<HashMap<String, Vec<Score>>>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of `run_id` in emission order.
    pub async fn spans_for(&self, run_id: &str) -> Vec<SpanRecord> {
        self.spans.read().await.get(run_id).cloned().unwrap_or_default()
    }

    pub async fn scores_for(&self, run_id: &str) -> Vec<Score> {
        self.scores.read().await.get(run_id).cloned().unwrap_or_default()
    }

    pub async fn run_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.spans.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl TraceSink for MemoryTraceSink {
    async fn record(&self, span: SpanRecord) {
        self.spans.write().await.entry(span.run_id.clone()).or_default().push(span);
    }

    async fn record_score(&self, run_id: &str, name: &str, value: f64) {
        self.scores
            .write()
            .await
            .entry(run_id.to_string())
            .or_default()
            .push(Score { name: name.to_string(), value });
    }
}

/// Forwards each record to several sinks.
#[derive(Default, Clone)]
pub struct FanoutTraceSink {
    sinks: Vec<Arc<dyn TraceSink>>,
}

impl FanoutTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl TraceSink for FanoutTraceSink {
    async fn record(&self, span: SpanRecord) {
        for sink in &self.sinks {
            sink.record(span.clone()).await;
        }
    }

    async fn record_score(&self, run_id: &str, name: &str, value: f64) {
        for sink in &self.sinks {
            sink.record_score(run_id, name, value).await;
        }
    }
}
