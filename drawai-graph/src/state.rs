//! Workflow state and the only path that mutates it.
//!
//! Nodes never touch [`WorkflowState`] directly. They return a
//! [`StateUpdate`], and the engine merges it with [`WorkflowState::apply`],
//! which enforces single assignment of `strategy`, `backend` and
//! `artifact_ref`.

use chrono::{DateTime, Utc};
use drawai_core::{Analysis, ArtifactRef, BackendKind, Strategy, ToolTraceEntry, append_clarification};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Running,
    AwaitingInput,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::AwaitingInput => "awaiting_input",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    AnalysisFailure,
    StrategyFailure,
    BackendFailure,
    /// Recoverable; recorded in the tool trace, never fails a run.
    ToolValidationFailure,
    ToolLoopExhausted,
    BackendExecutionFailure,
    StepBudgetExceeded,
    Cancelled,
    GenerationFailure,
    RoutingFailure,
    InvalidStateTransition,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalysisFailure => "AnalysisFailure",
            Self::StrategyFailure => "StrategyFailure",
            Self::BackendFailure => "BackendFailure",
            Self::ToolValidationFailure => "ToolValidationFailure",
            Self::ToolLoopExhausted => "ToolLoopExhausted",
            Self::BackendExecutionFailure => "BackendExecutionFailure",
            Self::StepBudgetExceeded => "StepBudgetExceeded",
            Self::Cancelled => "Cancelled",
            Self::GenerationFailure => "GenerationFailure",
            Self::RoutingFailure => "RoutingFailure",
            Self::InvalidStateTransition => "InvalidStateTransition",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure record of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RunError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The record threaded through every node of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    request: String,
    #[serde(default)]
    clarifications: Vec<String>,
    #[serde(default)]
    analysis: Option<Analysis>,
    #[serde(default)]
    strategy: Option<Strategy>,
    #[serde(default)]
    backend: Option<BackendKind>,
    #[serde(default)]
    tool_trace: Vec<ToolTraceEntry>,
    #[serde(default)]
    artifact_ref: Option<ArtifactRef>,
    #[serde(default)]
    status: RunStatus,
    #[serde(default)]
    error: Option<RunError>,
}

impl WorkflowState {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            clarifications: Vec::new(),
            analysis: None,
            strategy: None,
            backend: None,
            tool_trace: Vec::new(),
            artifact_ref: None,
            status: RunStatus::Pending,
            error: None,
        }
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    /// Clarifications supplied on resume, oldest first.
    pub fn clarifications(&self) -> &[String] {
        &self.clarifications
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    pub fn tool_trace(&self) -> &[ToolTraceEntry] {
        &self.tool_trace
    }

    pub fn artifact_ref(&self) -> Option<&ArtifactRef> {
        self.artifact_ref.as_ref()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn error(&self) -> Option<&RunError> {
        self.error.as_ref()
    }

    /// The clarifying question, present only while awaiting input.
    pub fn clarifying_question(&self) -> Option<&str> {
        if self.status != RunStatus::AwaitingInput {
            return None;
        }
        self.analysis.as_ref().and_then(Analysis::question)
    }

    /// Whether the analysis asked for input that has not been given yet.
    pub fn needs_clarification(&self) -> bool {
        self.analysis.as_ref().is_some_and(|a| a.is_ambiguous) && self.clarifications.is_empty()
    }

    /// Merge a partial update. Either the whole update applies or nothing does.
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), RunError> {
        let reassigned = |field: &str| {
            RunError::new(
                ErrorKind::InvalidStateTransition,
                format!("'{field}' is already assigned for this run"),
            )
        };
        if update.strategy.is_some() && self.strategy.is_some() {
            return Err(reassigned("strategy"));
        }
        if update.backend.is_some() && self.backend.is_some() {
            return Err(reassigned("backend"));
        }
        if let Some(artifact_ref) = &update.artifact_ref {
            if self.artifact_ref.is_some() {
                return Err(reassigned("artifact_ref"));
            }
            if artifact_ref.is_empty() {
                return Err(RunError::new(
                    ErrorKind::InvalidStateTransition,
                    "artifact_ref must not be empty",
                ));
            }
        }
        let strategy = update.strategy.or(self.strategy);
        if !update.tool_trace.is_empty() && strategy != Some(Strategy::ToolCall) {
            return Err(RunError::new(
                ErrorKind::InvalidStateTransition,
                "tool_trace entries require the tool_call strategy",
            ));
        }

        if let Some(analysis) = update.analysis {
            self.analysis = Some(analysis);
        }
        if update.strategy.is_some() {
            self.strategy = update.strategy;
        }
        if update.backend.is_some() {
            self.backend = update.backend;
        }
        self.tool_trace.extend(update.tool_trace);
        if update.artifact_ref.is_some() {
            self.artifact_ref = update.artifact_ref;
        }
        if let Some(error) = update.error {
            self.fail(error);
        }
        Ok(())
    }

    pub(crate) fn begin(&mut self) {
        self.status = RunStatus::Running;
    }

    pub(crate) fn suspend(&mut self) {
        self.status = RunStatus::AwaitingInput;
    }

    pub(crate) fn complete(&mut self) {
        self.status = RunStatus::Completed;
    }

    /// Mark the run failed. The first recorded error wins.
    pub(crate) fn fail(&mut self, error: RunError) {
        self.status = RunStatus::Failed;
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Append clarification text to the request and record it.
    pub(crate) fn clarify(&mut self, input: &str) {
        self.request = append_clarification(&self.request, input);
        self.clarifications.push(input.trim().to_string());
        self.status = RunStatus::Running;
    }

    /// Hex SHA-256 of the state's canonical JSON.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// Partial update produced by a node. Fields left unset are unchanged;
/// `tool_trace` entries are appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_trace: Vec<ToolTraceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<ArtifactRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_trace_entry(mut self, entry: ToolTraceEntry) -> Self {
        self.tool_trace.push(entry);
        self
    }

    pub fn with_trace(mut self, entries: Vec<ToolTraceEntry>) -> Self {
        self.tool_trace.extend(entries);
        self
    }

    pub fn with_artifact(mut self, artifact_ref: ArtifactRef) -> Self {
        self.artifact_ref = Some(artifact_ref);
        self
    }

    pub fn with_error(mut self, kind: ErrorKind, message: impl Into<String>) -> Self {
        self.error = Some(RunError::new(kind, message));
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// JSON form recorded in trace spans.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Snapshot taken when a run suspends; the only thing needed to resume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub run_id: String,
    /// Node that requested input.
    pub node_name: String,
    pub state: WorkflowState,
    /// Node transitions taken so far.
    pub step: usize,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(run_id: &str, node_name: &str, state: WorkflowState, step: usize) -> Self {
        Self {
            checkpoint_id: uuid::Uuid::new_v4().to_string(),
            run_id: run_id.to_string(),
            node_name: node_name.to_string(),
            state,
            step,
            created_at: Utc::now(),
        }
    }
}
