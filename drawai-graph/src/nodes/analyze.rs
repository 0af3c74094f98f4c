use crate::node::{NodeContext, NodeOutput};
use crate::retry::call_with_retry;
use crate::state::{ErrorKind, StateUpdate};
use drawai_core::Analysis;

/// Asked when the reasoning service flags ambiguity without a usable question.
pub(crate) const FALLBACK_QUESTION: &str = "Could you describe in more detail what you would like drawn?";

/// Classify the request; interrupt when it needs clarification.
pub(crate) async fn analyze(ctx: &NodeContext<'_>) -> NodeOutput {
    let reasoner = &ctx.services.reasoner;
    let pacer = ctx.pacer;
    let request = ctx.state.request();

    let analysis = match call_with_retry(&ctx.config.calls, "classify", move || async move {
        pacer.wait().await;
        reasoner.classify(request).await
    })
    .await
    {
        Ok(analysis) => analysis,
        Err(e) => return NodeOutput::fail(ErrorKind::AnalysisFailure, e.to_string()),
    };

    drawai_telemetry::debug!(
        ambiguous = analysis.is_ambiguous,
        confidence = analysis.confidence,
        "request analysed"
    );

    // Ambiguity after a clarification round is not asked about again.
    if analysis.is_ambiguous && ctx.state.clarifications().is_empty() {
        let analysis = if analysis.question().is_some() {
            analysis
        } else {
            Analysis::ambiguous(FALLBACK_QUESTION, analysis.confidence)
        };
        return NodeOutput::interrupt(StateUpdate::new().with_analysis(analysis));
    }

    NodeOutput::proceed(StateUpdate::new().with_analysis(analysis))
}
