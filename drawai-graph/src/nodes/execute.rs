use crate::node::{NodeContext, NodeOutput};
use crate::retry::call_with_retry;
use crate::state::{ErrorKind, StateUpdate};
use crate::tool_loop::ToolCallLoop;
use drawai_core::{Backend, BackendKind};
use drawai_telemetry::Instrument;
use std::sync::Arc;

async fn open_backend(ctx: &NodeContext<'_>) -> Result<Arc<dyn Backend>, NodeOutput> {
    let Some(kind) = ctx.state.backend() else {
        return Err(NodeOutput::fail(ErrorKind::BackendFailure, "no backend selected"));
    };
    create_backend(ctx, kind).await
}

async fn create_backend(
    ctx: &NodeContext<'_>,
    kind: BackendKind,
) -> Result<Arc<dyn Backend>, NodeOutput> {
    let backends = &ctx.services.backends;
    call_with_retry(&ctx.config.calls, "create_backend", move || backends.create(kind))
        .await
        .map_err(|e| NodeOutput::fail(ErrorKind::BackendExecutionFailure, e.to_string()))
}

/// Ask for the whole drawing at once and render whatever validates.
pub(crate) async fn execute_one_go(ctx: &NodeContext<'_>) -> NodeOutput {
    let backend = match open_backend(ctx).await {
        Ok(backend) => backend,
        Err(output) => return output,
    };
    let policy = &ctx.config.calls;
    let reasoner = &ctx.services.reasoner;
    let pacer = ctx.pacer;
    let request = ctx.state.request();
    let kind = backend.kind();
    let schema = backend.schema();

    let plan = match call_with_retry(policy, "plan_drawing", move || async move {
        pacer.wait().await;
        reasoner.plan_drawing(request, kind, schema).await
    })
    .await
    {
        Ok(plan) => plan,
        Err(e) => return NodeOutput::fail(ErrorKind::GenerationFailure, e.to_string()),
    };

    let (valid, invalid): (Vec<_>, Vec<_>) =
        plan.into_iter().partition(|call| schema.validate(call).is_ok());
    for call in &invalid {
        if let Err(reason) = schema.validate(call) {
            drawai_telemetry::warn!(tool = %call.name, reason = %reason, "skipping invalid planned call");
        }
    }
    if valid.is_empty() {
        return NodeOutput::fail(
            ErrorKind::GenerationFailure,
            format!("drawing plan contained no valid calls ({} rejected)", invalid.len()),
        );
    }

    let backend = &backend;
    for call in &valid {
        let executed = call_with_retry(policy, "execute", move || backend.execute(call))
            .instrument(drawai_telemetry::tool_span(&call.name))
            .await;
        if let Err(e) = executed {
            return NodeOutput::fail(ErrorKind::BackendExecutionFailure, format!("{}: {e}", call.name));
        }
    }

    match call_with_retry(policy, "finalize", move || backend.finalize()).await {
        Ok(artifact_ref) => {
            drawai_telemetry::info!(
                calls = valid.len(),
                skipped = invalid.len(),
                artifact = artifact_ref.as_str(),
                "one-go drawing finished"
            );
            NodeOutput::terminate(StateUpdate::new().with_artifact(artifact_ref))
        }
        Err(e) => NodeOutput::fail(ErrorKind::BackendExecutionFailure, e.to_string()),
    }
}

pub(crate) async fn execute_tool_call(ctx: &NodeContext<'_>) -> NodeOutput {
    let backend = match open_backend(ctx).await {
        Ok(backend) => backend,
        Err(output) => return output,
    };
    ToolCallLoop::new(ctx.config.tool_loop.max_iterations).run(ctx, backend).await.into_output()
}
