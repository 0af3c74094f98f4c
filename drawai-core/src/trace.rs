//! Structural trace records emitted after every node transition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a traced transition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanOutcome {
    Continue,
    Interrupt,
    Terminate,
    Failed,
    Cancelled,
}

impl SpanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SpanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub run_id: String,
    pub node_name: String,
    pub step: usize,
    /// Hex SHA-256 of the canonical JSON of the state the node received.
    pub input_digest: String,
    /// The partial update the node produced.
    pub output_update: Value,
    pub duration_ms: u64,
    pub outcome: SpanOutcome,
}

/// Append-only receiver of span records. The engine never reads it back.
#[async_trait]
pub trait TraceSink: Send + Sync {
    async fn record(&self, span: SpanRecord);

    /// Named evaluation score for a run.
    async fn record_score(&self, _run_id: &str, _name: &str, _value: f64) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTraceSink;

#[async_trait]
impl TraceSink for NoopTraceSink {
    async fn record(&self, _span: SpanRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serializes_snake_case() {
        assert_eq!(serde_json::to_value(SpanOutcome::Interrupt).unwrap(), json!("interrupt"));
        assert_eq!(SpanOutcome::Cancelled.to_string(), "cancelled");
    }

    #[tokio::test]
    async fn test_noop_sink_accepts_records() {
        let sink = NoopTraceSink;
        sink.record(SpanRecord {
            run_id: "r".into(),
            node_name: "analyze".into(),
            step: 0,
            input_digest: String::new(),
            output_update: json!({}),
            duration_ms: 0,
            outcome: SpanOutcome::Continue,
        })
        .await;
        sink.record_score("r", "prompt_confidence", 0.9).await;
    }
}
