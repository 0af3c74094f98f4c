//! Bounded tool-call loop behind the `execute_tool_call` node.
//!
//! Each iteration asks the reasoning service for the next primitive (or
//! `finish`), validates it against the backend's schema and executes it.
//! Every iteration that does not finish appends exactly one trace entry.

use crate::node::{NodeContext, NodeOutput};
use crate::retry::call_with_retry;
use crate::state::{ErrorKind, StateUpdate};
use drawai_core::{Backend, NextAction, ToolTraceEntry};
use drawai_telemetry::Instrument;
use std::sync::Arc;

/// Outcome of one loop, before it is turned into a [`NodeOutput`].
#[derive(Debug)]
pub enum LoopOutcome {
    Finished { artifact_ref: drawai_core::ArtifactRef, entries: Vec<ToolTraceEntry> },
    Failed { kind: ErrorKind, message: String, entries: Vec<ToolTraceEntry> },
}

impl LoopOutcome {
    pub fn into_output(self) -> NodeOutput {
        match self {
            Self::Finished { artifact_ref, entries } => NodeOutput::terminate(
                StateUpdate::new().with_trace(entries).with_artifact(artifact_ref),
            ),
            Self::Failed { kind, message, entries } => NodeOutput::terminate(
                StateUpdate::new().with_trace(entries).with_error(kind, message),
            ),
        }
    }
}

pub struct ToolCallLoop {
    max_iterations: usize,
}

impl ToolCallLoop {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub async fn run(&self, ctx: &NodeContext<'_>, backend: Arc<dyn Backend>) -> LoopOutcome {
        let policy = &ctx.config.calls;
        let reasoner = &ctx.services.reasoner;
        let pacer = ctx.pacer;
        let request = ctx.state.request();
        let schema = backend.schema().clone();
        let backend = &backend;

        let mut trace: Vec<ToolTraceEntry> = ctx.state.tool_trace().to_vec();
        let mut entries = Vec::new();

        for iteration in 0..self.max_iterations {
            let history = trace.as_slice();
            let schema_ref = &schema;
            let next = call_with_retry(policy, "next_tool_call", move || async move {
                pacer.wait().await;
                reasoner.next_tool_call(request, history, schema_ref).await
            })
            .await;

            let call = match next {
                Ok(NextAction::Call(call)) => call,
                Ok(NextAction::Finish) => {
                    return match call_with_retry(policy, "finalize", move || backend.finalize()).await
                    {
                        Ok(artifact_ref) => {
                            drawai_telemetry::info!(
                                iterations = iteration,
                                artifact = artifact_ref.as_str(),
                                "tool loop finished"
                            );
                            LoopOutcome::Finished { artifact_ref, entries }
                        }
                        Err(e) => LoopOutcome::Failed {
                            kind: ErrorKind::BackendExecutionFailure,
                            message: e.to_string(),
                            entries,
                        },
                    };
                }
                Err(e) => {
                    return LoopOutcome::Failed {
                        kind: ErrorKind::GenerationFailure,
                        message: e.to_string(),
                        entries,
                    };
                }
            };

            let entry = match schema.validate(&call) {
                Err(reason) => {
                    drawai_telemetry::warn!(
                        tool = %call.name,
                        reason = %reason,
                        "rejected tool call; feeding the failure back"
                    );
                    ToolTraceEntry::rejected(&call, reason.to_string())
                }
                Ok(()) => {
                    let call_ref = &call;
                    let executed = call_with_retry(policy, "execute", move || {
                        backend.execute(call_ref)
                    })
                    .instrument(drawai_telemetry::tool_span(&call.name))
                    .await;
                    match executed {
                        Ok(summary) => ToolTraceEntry::executed(&call, summary),
                        Err(e) => {
                            return LoopOutcome::Failed {
                                kind: ErrorKind::BackendExecutionFailure,
                                message: format!("{}: {e}", call.name),
                                entries,
                            };
                        }
                    }
                }
            };

            trace.push(entry.clone());
            entries.push(entry);
        }

        LoopOutcome::Failed {
            kind: ErrorKind::ToolLoopExhausted,
            message: format!(
                "no finish signal after {} iterations",
                self.max_iterations
            ),
            entries,
        }
    }
}
