use crate::schema::ValidationError;

/// Errors raised by DrawAI collaborators (reasoning service, backends, stores).
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error("Reasoning error: {0}")]
    Reasoning(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{operation} timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DrawError {
    /// Whether a failed external call may succeed when attempted again.
    ///
    /// Timeouts and reasoning/backend faults are transient from the engine's
    /// point of view; configuration and data errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Reasoning(_) | Self::Backend(_))
    }
}

pub type Result<T> = std::result::Result<T, DrawError>;
