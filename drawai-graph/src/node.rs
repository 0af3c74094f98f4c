//! Node roles and the contract between nodes and the engine
//!
//! The set of nodes is closed: every node is a [`NodeRole`], dispatched
//! statically. A node reads a [`NodeContext`] and returns a [`NodeOutput`];
//! it never mutates state itself.

use crate::config::EngineConfig;
use crate::nodes;
use crate::retry::Pacer;
use crate::state::{ErrorKind, StateUpdate, WorkflowState};
use drawai_core::{BackendProvider, NoopTraceSink, ReasoningService, TraceSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The five node roles of a drawing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Analyze,
    SelectStrategy,
    SelectBackend,
    ExecuteOneGo,
    ExecuteToolCall,
}

impl NodeRole {
    pub const ALL: [NodeRole; 5] = [
        Self::Analyze,
        Self::SelectStrategy,
        Self::SelectBackend,
        Self::ExecuteOneGo,
        Self::ExecuteToolCall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::SelectStrategy => "select_strategy",
            Self::SelectBackend => "select_backend",
            Self::ExecuteOneGo => "execute_one_go",
            Self::ExecuteToolCall => "execute_tool_call",
        }
    }

    /// Run this role against the context.
    pub async fn apply(&self, ctx: &NodeContext<'_>) -> NodeOutput {
        match self {
            Self::Analyze => nodes::analyze(ctx).await,
            Self::SelectStrategy => nodes::select_strategy(ctx).await,
            Self::SelectBackend => nodes::select_backend(ctx).await,
            Self::ExecuteOneGo => nodes::execute_one_go(ctx).await,
            Self::ExecuteToolCall => nodes::execute_tool_call(ctx).await,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| format!("unknown node '{s}'"))
    }
}

/// What the engine should do after applying a node's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSignal {
    /// Ask the router for the next node.
    Continue,
    /// Suspend the run until a clarification arrives.
    Interrupt,
    /// End the run.
    Terminate,
}

/// Output from a node execution
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput {
    pub update: StateUpdate,
    pub signal: NodeSignal,
}

impl NodeOutput {
    pub fn proceed(update: StateUpdate) -> Self {
        Self { update, signal: NodeSignal::Continue }
    }

    pub fn interrupt(update: StateUpdate) -> Self {
        Self { update, signal: NodeSignal::Interrupt }
    }

    pub fn terminate(update: StateUpdate) -> Self {
        Self { update, signal: NodeSignal::Terminate }
    }

    /// Terminate the run with a recorded failure.
    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::terminate(StateUpdate::new().with_error(kind, message))
    }
}

/// Collaborators shared by every run of an engine.
#[derive(Clone)]
pub struct Services {
    pub reasoner: Arc<dyn ReasoningService>,
    pub backends: Arc<dyn BackendProvider>,
    pub trace: Arc<dyn TraceSink>,
}

impl Services {
    pub fn new(reasoner: Arc<dyn ReasoningService>, backends: Arc<dyn BackendProvider>) -> Self {
        Self { reasoner, backends, trace: Arc::new(NoopTraceSink) }
    }

    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }
}

/// Context passed to nodes during execution
pub struct NodeContext<'a> {
    pub run_id: &'a str,
    /// Transitions taken before this one.
    pub step: usize,
    pub state: &'a WorkflowState,
    pub config: &'a EngineConfig,
    pub services: &'a Services,
    pub pacer: &'a Pacer,
}
