use drawai_core::{SpanOutcome, SpanRecord, TraceSink};
use drawai_telemetry::{FanoutTraceSink, LogTraceSink, MemoryTraceSink};
use serde_json::json;
use std::sync::Arc;

fn record(run_id: &str, node: &str, step: usize) -> SpanRecord {
    SpanRecord {
        run_id: run_id.to_string(),
        node_name: node.to_string(),
        step,
        input_digest: "00".repeat(32),
        output_update: json!({"strategy": "one_go"}),
        duration_ms: 1,
        outcome: SpanOutcome::Continue,
    }
}

#[tokio::test]
async fn memory_sink_groups_by_run() {
    let sink = MemoryTraceSink::new();
    sink.record(record("a", "analyze", 0)).await;
    sink.record(record("b", "analyze", 0)).await;
    sink.record(record("a", "select_strategy", 1)).await;

    let spans = sink.spans_for("a").await;
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].node_name, "select_strategy");
    assert_eq!(sink.run_ids().await, vec!["a".to_string(), "b".to_string()]);
    assert!(sink.spans_for("missing").await.is_empty());
}

#[tokio::test]
async fn fanout_reaches_every_sink() {
    let memory = Arc::new(MemoryTraceSink::new());
    let fanout = FanoutTraceSink::new().with_sink(Arc::new(LogTraceSink)).with_sink(memory.clone());

    fanout.record(record("r", "analyze", 0)).await;
    fanout.record_score("r", "prompt_confidence", 0.9).await;

    assert_eq!(memory.spans_for("r").await.len(), 1);
    let scores = memory.scores_for("r").await;
    assert_eq!(scores[0].name, "prompt_confidence");
    assert_eq!(scores[0].value, 0.9);
}

#[test]
fn init_is_idempotent() {
    drawai_telemetry::init_telemetry("test").unwrap();
    drawai_telemetry::init_json_telemetry("test").unwrap();
    drawai_telemetry::init_telemetry("test").unwrap();
}

#[tokio::test]
async fn log_sink_emits_every_outcome_and_score() {
    let sink = LogTraceSink;
    for outcome in [SpanOutcome::Continue, SpanOutcome::Failed, SpanOutcome::Cancelled] {
        sink.record(SpanRecord { outcome, ..record("r", "analyze", 1) }).await;
    }
    sink.record_score("r", "prompt_confidence", 0.4).await;
}
