//! Sequential execution engine for drawing workflows
//!
//! One run is a single sequence of node transitions: apply a node, merge its
//! update, then follow its signal. `run`, `resume` and `stream` all drive the
//! same [`GraphEngine::advance`] step.

use crate::checkpoint::Checkpointer;
use crate::config::EngineConfig;
use crate::edge::Route;
use crate::error::{GraphError, Result};
use crate::graph::CompiledGraph;
use crate::interrupt::InterruptController;
use crate::node::{NodeContext, NodeOutput, NodeRole, NodeSignal, Services};
use crate::retry::Pacer;
use crate::state::{Checkpoint, ErrorKind, RunError, RunStatus, WorkflowState};
use crate::stream::StreamEvent;
use drawai_core::{SpanOutcome, SpanRecord};
use drawai_telemetry::Instrument;
use futures::Stream;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Score reported after `analyze` with the analysis confidence.
pub const PROMPT_CONFIDENCE_SCORE: &str = "prompt_confidence";

/// How a call to the engine ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// The run reached `completed` or `failed`.
    Finished(WorkflowState),
    /// The run is awaiting a clarification.
    Suspended(Checkpoint),
}

impl Execution {
    pub fn state(&self) -> &WorkflowState {
        match self {
            Self::Finished(state) => state,
            Self::Suspended(checkpoint) => &checkpoint.state,
        }
    }

    pub fn into_state(self) -> WorkflowState {
        match self {
            Self::Finished(state) => state,
            Self::Suspended(checkpoint) => checkpoint.state,
        }
    }

    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        match self {
            Self::Suspended(checkpoint) => Some(checkpoint),
            Self::Finished(_) => None,
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended(_))
    }
}

enum Phase {
    Next(NodeRole),
    Suspended(Checkpoint),
    Done,
}

struct Cursor {
    run_id: String,
    state: WorkflowState,
    phase: Phase,
    /// Transitions taken so far, carried across suspensions.
    step: usize,
}

impl Cursor {
    fn next_role(&self) -> Option<NodeRole> {
        match self.phase {
            Phase::Next(role) => Some(role),
            Phase::Suspended(_) | Phase::Done => None,
        }
    }

    fn stop_with(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.state.fail(RunError::new(kind, message));
        self.phase = Phase::Done;
    }
}

/// A transition that was executed.
#[derive(Debug, Clone, Copy)]
struct Transition {
    node: NodeRole,
    step: usize,
    duration_ms: u64,
    outcome: SpanOutcome,
}

pub struct GraphEngine {
    graph: Arc<CompiledGraph>,
    services: Services,
    config: EngineConfig,
    interrupts: InterruptController,
}

impl GraphEngine {
    pub fn new(graph: CompiledGraph, services: Services) -> Self {
        Self {
            graph: Arc::new(graph),
            services,
            config: EngineConfig::default(),
            interrupts: InterruptController::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_checkpointer<C: Checkpointer + 'static>(self, checkpointer: C) -> Self {
        self.with_checkpointer_arc(Arc::new(checkpointer))
    }

    pub fn with_checkpointer_arc(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.interrupts = InterruptController::new(Some(checkpointer));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &CompiledGraph {
        &self.graph
    }

    pub fn checkpointer(&self) -> Option<&Arc<dyn Checkpointer>> {
        self.interrupts.store()
    }

    /// Run a fresh state to completion or suspension.
    pub async fn run(&self, run_id: &str, state: WorkflowState) -> Result<Execution> {
        self.run_with_cancel(run_id, state, &CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
        &self,
        run_id: &str,
        state: WorkflowState,
        cancel: &CancellationToken,
    ) -> Result<Execution> {
        let cursor = self.start(run_id, state)?;
        self.drive(cursor, cancel).instrument(drawai_telemetry::run_span(run_id)).await
    }

    /// Continue a suspended run with the user's clarification. The
    /// interrupting node is not run again.
    pub async fn resume(&self, checkpoint: Checkpoint, input: &str) -> Result<Execution> {
        self.resume_with_cancel(checkpoint, input, &CancellationToken::new()).await
    }

    pub async fn resume_with_cancel(
        &self,
        checkpoint: Checkpoint,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<Execution> {
        let run_id = checkpoint.run_id.clone();
        let (state, node, step) = InterruptController::restore(checkpoint, input)?;
        let mut cursor = Cursor { run_id: run_id.clone(), state, phase: Phase::Done, step };

        match self.graph.next(node, &cursor.state) {
            Ok(Route::Node(next)) => cursor.phase = Phase::Next(next),
            Ok(Route::End) => self.finish(&mut cursor),
            Ok(Route::Suspend) => cursor.stop_with(
                ErrorKind::RoutingFailure,
                format!("'{node}' asked for input again after a clarification"),
            ),
            Err(message) => cursor.stop_with(ErrorKind::RoutingFailure, message),
        }

        drawai_telemetry::info!(run.id = %run_id, resumed_after = node.name(), "resuming run");
        self.drive(cursor, cancel).instrument(drawai_telemetry::run_span(&run_id)).await
    }

    /// Claim the stored checkpoint of `run_id` and resume it.
    pub async fn resume_run(
        &self,
        run_id: &str,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<Execution> {
        // Blank input must not consume the checkpoint.
        if input.trim().is_empty() {
            return Err(GraphError::EmptyClarification);
        }
        let checkpoint = self.interrupts.claim(run_id).await?;
        self.resume_with_cancel(checkpoint, input, cancel).await
    }

    /// Run a fresh state, yielding progress events as nodes execute.
    pub fn stream<'a>(
        &'a self,
        run_id: &'a str,
        state: WorkflowState,
    ) -> impl Stream<Item = Result<StreamEvent>> + 'a {
        async_stream::stream! {
            let mut cursor = match self.start(run_id, state) {
                Ok(cursor) => cursor,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let cancel = CancellationToken::new();
            let pacer = self.pacer();

            while let Some(role) = cursor.next_role() {
                yield Ok(StreamEvent::node_start(role.name(), cursor.step + 1));
                match self.advance(&mut cursor, &cancel, &pacer).await {
                    Ok(Some(t)) => {
                        yield Ok(StreamEvent::node_end(t.node.name(), t.step, t.duration_ms, t.outcome));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            match cursor.phase {
                Phase::Suspended(checkpoint) => {
                    let question = checkpoint.state.clarifying_question().unwrap_or_default().to_string();
                    yield Ok(StreamEvent::interrupted(&checkpoint.node_name, &question, &checkpoint.checkpoint_id));
                }
                Phase::Next(_) | Phase::Done => {
                    yield Ok(StreamEvent::done(cursor.state, cursor.step));
                }
            }
        }
    }

    fn start(&self, run_id: &str, mut state: WorkflowState) -> Result<Cursor> {
        if !matches!(state.status(), RunStatus::Pending | RunStatus::Running) {
            return Err(GraphError::InvalidRunState(state.status()));
        }
        state.begin();
        Ok(Cursor {
            run_id: run_id.to_string(),
            state,
            phase: Phase::Next(self.graph.entry()),
            step: 0,
        })
    }

    fn pacer(&self) -> Pacer {
        Pacer::new(self.config.calls.min_interval())
    }

    async fn drive(&self, mut cursor: Cursor, cancel: &CancellationToken) -> Result<Execution> {
        let pacer = self.pacer();
        while cursor.next_role().is_some() {
            self.advance(&mut cursor, cancel, &pacer).await?;
        }

        match cursor.phase {
            Phase::Suspended(checkpoint) => Ok(Execution::Suspended(checkpoint)),
            Phase::Next(_) | Phase::Done => {
                let state = cursor.state;
                match state.error() {
                    Some(error) => drawai_telemetry::warn!(
                        run.id = %cursor.run_id,
                        steps = cursor.step,
                        error.kind = error.kind.as_str(),
                        error.message = %error.message,
                        "run failed"
                    ),
                    None => drawai_telemetry::info!(
                        run.id = %cursor.run_id,
                        steps = cursor.step,
                        artifact = state.artifact_ref().map(|a| a.as_str()).unwrap_or_default(),
                        "run completed"
                    ),
                }
                Ok(Execution::Finished(state))
            }
        }
    }

    /// Execute the pending node, merge its output and pick what comes next.
    ///
    /// Returns `None` when the run stopped before a node could execute.
    async fn advance(
        &self,
        cursor: &mut Cursor,
        cancel: &CancellationToken,
        pacer: &Pacer,
    ) -> Result<Option<Transition>> {
        let Some(role) = cursor.next_role() else {
            return Ok(None);
        };

        if cancel.is_cancelled() {
            cursor.stop_with(ErrorKind::Cancelled, format!("run cancelled before '{role}'"));
            return Ok(None);
        }
        if cursor.step >= self.config.step_limit {
            let message = format!("no terminal state after {} node transitions", cursor.step);
            cursor.stop_with(ErrorKind::StepBudgetExceeded, message);
            return Ok(None);
        }

        let input_digest = cursor.state.digest();
        let span = drawai_telemetry::node_span(&cursor.run_id, role.name(), cursor.step + 1);
        let started = Instant::now();
        let output = {
            let ctx = NodeContext {
                run_id: &cursor.run_id,
                step: cursor.step,
                state: &cursor.state,
                config: &self.config,
                services: &self.services,
                pacer,
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                output = role.apply(&ctx).instrument(span) => Some(output),
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        cursor.step += 1;

        let (output_update, outcome) = match output {
            None => {
                cursor.stop_with(ErrorKind::Cancelled, format!("run cancelled while '{role}' was running"));
                (Value::Null, SpanOutcome::Cancelled)
            }
            Some(output) => {
                let update = output.update.to_value();
                let confidence = match role {
                    NodeRole::Analyze => output.update.analysis.as_ref().map(|a| a.confidence),
                    _ => None,
                };
                let outcome = self.settle(cursor, role, output).await?;
                if let Some(confidence) = confidence {
                    self.services
                        .trace
                        .record_score(&cursor.run_id, PROMPT_CONFIDENCE_SCORE, f64::from(confidence))
                        .await;
                }
                (update, outcome)
            }
        };

        drawai_telemetry::debug!(
            run.id = %cursor.run_id,
            node = role.name(),
            step = cursor.step,
            duration_ms = duration_ms,
            outcome = outcome.as_str(),
            "node transition"
        );
        self.services
            .trace
            .record(SpanRecord {
                run_id: cursor.run_id.clone(),
                node_name: role.name().to_string(),
                step: cursor.step,
                input_digest,
                output_update,
                duration_ms,
                outcome,
            })
            .await;

        Ok(Some(Transition { node: role, step: cursor.step, duration_ms, outcome }))
    }

    async fn settle(
        &self,
        cursor: &mut Cursor,
        role: NodeRole,
        output: NodeOutput,
    ) -> Result<SpanOutcome> {
        let NodeOutput { update, signal } = output;
        if let Err(error) = cursor.state.apply(update) {
            cursor.stop_with(error.kind, error.message);
            return Ok(SpanOutcome::Failed);
        }
        if cursor.state.status() == RunStatus::Failed {
            cursor.phase = Phase::Done;
            return Ok(SpanOutcome::Failed);
        }

        match signal {
            NodeSignal::Interrupt => self.suspend(cursor, role).await,
            NodeSignal::Terminate => {
                self.finish(cursor);
                Ok(Self::terminal_outcome(cursor, SpanOutcome::Terminate))
            }
            NodeSignal::Continue => match self.graph.next(role, &cursor.state) {
                Ok(Route::Node(next)) => {
                    cursor.phase = Phase::Next(next);
                    Ok(SpanOutcome::Continue)
                }
                Ok(Route::End) => {
                    self.finish(cursor);
                    Ok(Self::terminal_outcome(cursor, SpanOutcome::Continue))
                }
                Ok(Route::Suspend) => self.suspend(cursor, role).await,
                Err(message) => {
                    cursor.stop_with(ErrorKind::RoutingFailure, message);
                    Ok(SpanOutcome::Failed)
                }
            },
        }
    }

    fn terminal_outcome(cursor: &Cursor, success: SpanOutcome) -> SpanOutcome {
        if cursor.state.status() == RunStatus::Failed { SpanOutcome::Failed } else { success }
    }

    async fn suspend(&self, cursor: &mut Cursor, role: NodeRole) -> Result<SpanOutcome> {
        if cursor.state.analysis().and_then(|a| a.question()).is_none() {
            cursor.stop_with(
                ErrorKind::InvalidStateTransition,
                format!("'{role}' interrupted without a clarifying question"),
            );
            return Ok(SpanOutcome::Failed);
        }
        cursor.state.suspend();
        let checkpoint = self
            .interrupts
            .suspend(&cursor.run_id, role, cursor.state.clone(), cursor.step)
            .await?;
        cursor.phase = Phase::Suspended(checkpoint);
        Ok(SpanOutcome::Interrupt)
    }

    /// A run may only complete with an artifact.
    fn finish(&self, cursor: &mut Cursor) {
        if cursor.state.status() == RunStatus::Failed {
            cursor.phase = Phase::Done;
        } else if cursor.state.artifact_ref().is_some() {
            cursor.state.complete();
            cursor.phase = Phase::Done;
        } else {
            cursor.stop_with(ErrorKind::RoutingFailure, "run reached the end without an artifact");
        }
    }
}
