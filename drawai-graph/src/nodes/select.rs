use crate::node::{NodeContext, NodeOutput};
use crate::retry::call_with_retry;
use crate::state::{ErrorKind, StateUpdate};

pub(crate) async fn select_strategy(ctx: &NodeContext<'_>) -> NodeOutput {
    let Some(analysis) = ctx.state.analysis() else {
        return NodeOutput::fail(ErrorKind::StrategyFailure, "no analysis to choose a strategy from");
    };
    let reasoner = &ctx.services.reasoner;
    let pacer = ctx.pacer;
    let request = ctx.state.request();

    match call_with_retry(&ctx.config.calls, "choose_strategy", move || async move {
        pacer.wait().await;
        reasoner.choose_strategy(request, analysis).await
    })
    .await
    {
        Ok(strategy) => {
            drawai_telemetry::debug!(strategy = strategy.as_str(), "strategy selected");
            NodeOutput::proceed(StateUpdate::new().with_strategy(strategy))
        }
        Err(e) => NodeOutput::fail(ErrorKind::StrategyFailure, e.to_string()),
    }
}

pub(crate) async fn select_backend(ctx: &NodeContext<'_>) -> NodeOutput {
    let Some(strategy) = ctx.state.strategy() else {
        return NodeOutput::fail(ErrorKind::BackendFailure, "no strategy to choose a backend for");
    };
    let reasoner = &ctx.services.reasoner;
    let pacer = ctx.pacer;
    let request = ctx.state.request();

    match call_with_retry(&ctx.config.calls, "choose_backend", move || async move {
        pacer.wait().await;
        reasoner.choose_backend(request, strategy).await
    })
    .await
    {
        Ok(backend) => {
            drawai_telemetry::debug!(backend = backend.as_str(), "backend selected");
            NodeOutput::proceed(StateUpdate::new().with_backend(backend))
        }
        Err(e) => NodeOutput::fail(ErrorKind::BackendFailure, e.to_string()),
    }
}
