//! Span helpers for workflow runs.

use tracing::Span;

/// Span covering one run, from submit or resume until it suspends or ends.
///
/// # Example
/// ```
/// use drawai_telemetry::run_span;
/// let span = run_span("run-123");
/// let _enter = span.enter();
/// ```
pub fn run_span(run_id: &str) -> Span {
    tracing::info_span!("drawai.run", run.id = run_id, otel.kind = "internal")
}

/// Span for one node transition.
pub fn node_span(run_id: &str, node: &str, step: usize) -> Span {
    tracing::info_span!("drawai.node", run.id = run_id, node.name = node, node.step = step)
}

/// Span for one primitive call inside the tool loop.
pub fn tool_span(tool: &str) -> Span {
    tracing::debug_span!("drawai.tool", tool.name = tool)
}

/// Span around a call to the reasoning service or a backend.
pub fn external_call_span(operation: &str) -> Span {
    tracing::debug_span!("drawai.call", call.operation = operation, otel.kind = "client")
}
