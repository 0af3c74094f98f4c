//! Human-in-the-loop suspension
//!
//! Suspending never parks a task: the run returns a [`Checkpoint`] to the
//! caller and, when a store is attached, persists it. Resuming is a separate
//! call that may come from another process.

use crate::checkpoint::Checkpointer;
use crate::error::{GraphError, Result};
use crate::node::NodeRole;
use crate::state::{Checkpoint, RunStatus, WorkflowState};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InterruptController {
    store: Option<Arc<dyn Checkpointer>>,
}

impl InterruptController {
    pub fn new(store: Option<Arc<dyn Checkpointer>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Option<&Arc<dyn Checkpointer>> {
        self.store.as_ref()
    }

    /// Snapshot a run that is awaiting input.
    pub async fn suspend(
        &self,
        run_id: &str,
        node: NodeRole,
        state: WorkflowState,
        step: usize,
    ) -> Result<Checkpoint> {
        let checkpoint = Checkpoint::new(run_id, node.name(), state, step);
        if let Some(store) = &self.store {
            store.save(&checkpoint).await?;
        }
        drawai_telemetry::info!(
            run.id = %run_id,
            node = node.name(),
            step = step,
            "run suspended for clarification"
        );
        Ok(checkpoint)
    }

    /// Remove the stored checkpoint of a run so it can be resumed.
    pub async fn claim(&self, run_id: &str) -> Result<Checkpoint> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| GraphError::CheckpointError("no checkpoint store configured".into()))?;
        store.take(run_id).await?.ok_or_else(|| GraphError::CheckpointNotFound(run_id.to_string()))
    }

    /// Merge the clarification into the checkpointed state.
    ///
    /// Returns the state ready to continue and the node that asked for input.
    pub fn restore(checkpoint: Checkpoint, input: &str) -> Result<(WorkflowState, NodeRole, usize)> {
        if input.trim().is_empty() {
            return Err(GraphError::EmptyClarification);
        }
        let Checkpoint { node_name, mut state, step, .. } = checkpoint;
        if state.status() != RunStatus::AwaitingInput {
            return Err(GraphError::InvalidRunState(state.status()));
        }
        let node = node_name.parse::<NodeRole>().map_err(GraphError::NodeNotFound)?;
        state.clarify(input);
        Ok((state, node, step))
    }
}
