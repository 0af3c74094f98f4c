//! Progress events for live viewers

use crate::state::WorkflowState;
use drawai_core::SpanOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    NodeStart { node: String, step: usize },
    NodeEnd { node: String, step: usize, duration_ms: u64, outcome: SpanOutcome },
    /// The run is waiting for a clarification.
    Interrupted { node: String, question: String, checkpoint_id: String },
    Done { state: WorkflowState, total_steps: usize },
}

impl StreamEvent {
    pub fn node_start(node: &str, step: usize) -> Self {
        Self::NodeStart { node: node.to_string(), step }
    }

    pub fn node_end(node: &str, step: usize, duration_ms: u64, outcome: SpanOutcome) -> Self {
        Self::NodeEnd { node: node.to_string(), step, duration_ms, outcome }
    }

    pub fn interrupted(node: &str, question: &str, checkpoint_id: &str) -> Self {
        Self::Interrupted {
            node: node.to_string(),
            question: question.to_string(),
            checkpoint_id: checkpoint_id.to_string(),
        }
    }

    pub fn done(state: WorkflowState, total_steps: usize) -> Self {
        Self::Done { state, total_steps }
    }
}
