use drawai_graph::GraphError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Request text must not be empty")]
    EmptyRequest,

    #[error("Backend canvas {backend} does not match the engine canvas {engine}")]
    CanvasMismatch { engine: String, backend: String },

    #[error("Run '{0}' is already in progress")]
    RunActive(String),

    #[error("Run task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
