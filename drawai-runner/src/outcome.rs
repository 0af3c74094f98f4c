use drawai_core::ArtifactRef;
use drawai_graph::{Execution, RunError, RunStatus};
use serde::{Deserialize, Serialize};

/// What a caller learns about a run.
///
/// A completed run carries its artifact, a failed run its error, and a
/// suspended run only the question it is waiting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifying_question: Option<String>,
}

impl RunOutcome {
    pub fn from_execution(run_id: &str, execution: &Execution) -> Self {
        let state = execution.state();
        let status = state.status();
        Self {
            run_id: run_id.to_string(),
            status,
            artifact_ref: match status {
                RunStatus::Completed => state.artifact_ref().cloned(),
                _ => None,
            },
            error: match status {
                RunStatus::Failed => state.error().cloned(),
                _ => None,
            },
            clarifying_question: state.clarifying_question().map(str::to_string),
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.status == RunStatus::AwaitingInput
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
