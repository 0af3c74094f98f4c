//! Error types for drawai-graph
//!
//! These cover infrastructure faults only. A run that fails for domain
//! reasons still returns `Ok`, with the failure recorded in
//! [`WorkflowState::error`](crate::state::WorkflowState::error).

use crate::state::RunStatus;
use drawai_core::DrawError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Graph structure is invalid
    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge target not found: {0}")]
    EdgeTargetNotFound(String),

    #[error("No entry point defined (missing edge from START)")]
    NoEntryPoint,

    /// A run was started or resumed from a state that does not allow it
    #[error("Run cannot proceed from status '{0}'")]
    InvalidRunState(RunStatus),

    #[error("Clarification text must not be empty")]
    EmptyClarification,

    #[error("Checkpoint error: {0}")]
    CheckpointError(String),

    #[error("No checkpoint stored for run '{0}'")]
    CheckpointNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("DrawAI error: {0}")]
    Draw(#[from] DrawError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
