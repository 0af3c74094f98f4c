//! Edge types for graph control flow
//!
//! Edges define how execution flows between nodes. Routers are pure
//! functions of [`WorkflowState`].

use crate::node::NodeRole;
use crate::state::{RunStatus, WorkflowState};
use drawai_core::Strategy;
use std::collections::HashMap;
use std::sync::Arc;

/// Special node identifiers
pub const START: &str = "__start__";
pub const END: &str = "__end__";
/// Pseudo-target that suspends the run for clarification.
pub const SUSPEND: &str = "__suspend__";

/// Target of an edge
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeTarget {
    Node(String),
    End,
    Suspend,
}

impl EdgeTarget {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::Node(name) => Some(name),
            Self::End | Self::Suspend => None,
        }
    }
}

impl From<&str> for EdgeTarget {
    fn from(s: &str) -> Self {
        match s {
            END => Self::End,
            SUSPEND => Self::Suspend,
            name => Self::Node(name.to_string()),
        }
    }
}

/// Where the engine goes after a node returns `continue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Node(NodeRole),
    End,
    Suspend,
}

/// Router function type
pub type RouterFn = Arc<dyn Fn(&WorkflowState) -> String + Send + Sync>;

/// Edge type
#[derive(Clone)]
pub enum Edge {
    /// Direct edge: always go from source to target
    Direct { source: String, target: EdgeTarget },

    /// Conditional edge: route based on state
    Conditional {
        source: String,
        router: RouterFn,
        /// Route names the router may return, mapped to their targets
        targets: HashMap<String, EdgeTarget>,
    },

    /// Entry edge: from START to the first node
    Entry { target: String },
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { source, target } => {
                f.debug_struct("Direct").field("source", source).field("target", target).finish()
            }
            Self::Conditional { source, targets, .. } => f
                .debug_struct("Conditional")
                .field("source", source)
                .field("targets", targets)
                .finish(),
            Self::Entry { target } => f.debug_struct("Entry").field("target", target).finish(),
        }
    }
}

impl Edge {
    /// Source node name; `START` for the entry edge.
    pub fn source(&self) -> &str {
        match self {
            Self::Direct { source, .. } | Self::Conditional { source, .. } => source,
            Self::Entry { .. } => START,
        }
    }
}

/// Routing policy of the drawing workflow.
///
/// Predicates are checked in a fixed order and the first match wins:
///
/// 1. a failed run ends;
/// 2. a missing analysis goes to `analyze`;
/// 3. an ambiguous analysis with no clarification suspends;
/// 4. a missing strategy goes to `select_strategy`;
/// 5. a missing backend goes to `select_backend`;
/// 6. an existing artifact ends;
/// 7. otherwise the executor matching the strategy runs.
pub struct DrawingRouter;

impl DrawingRouter {
    pub fn route(state: &WorkflowState) -> String {
        Self::decide(state).to_string()
    }

    fn decide(state: &WorkflowState) -> &'static str {
        if state.status() == RunStatus::Failed {
            return END;
        }
        if state.analysis().is_none() {
            return NodeRole::Analyze.name();
        }
        if state.needs_clarification() {
            return SUSPEND;
        }
        let Some(strategy) = state.strategy() else {
            return NodeRole::SelectStrategy.name();
        };
        if state.backend().is_none() {
            return NodeRole::SelectBackend.name();
        }
        if state.artifact_ref().is_some() {
            return END;
        }
        match strategy {
            Strategy::OneGo => NodeRole::ExecuteOneGo.name(),
            Strategy::ToolCall => NodeRole::ExecuteToolCall.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use drawai_core::{Analysis, ArtifactRef, BackendKind};

    fn analysed(analysis: Analysis) -> WorkflowState {
        let mut state = WorkflowState::new("request");
        state.apply(StateUpdate::new().with_analysis(analysis)).unwrap();
        state
    }

    #[test]
    fn test_edge_target_from_str() {
        assert_eq!(EdgeTarget::from(END), EdgeTarget::End);
        assert_eq!(EdgeTarget::from(SUSPEND), EdgeTarget::Suspend);
        assert_eq!(EdgeTarget::from("analyze").node_name(), Some("analyze"));
    }

    #[test]
    fn test_ambiguity_checked_before_strategy() {
        let state = analysed(Analysis::ambiguous("which?", 0.2));
        assert_eq!(DrawingRouter::route(&state), SUSPEND);
    }

    #[test]
    fn test_route_progression() {
        let mut state = WorkflowState::new("request");
        assert_eq!(DrawingRouter::route(&state), "analyze");

        state.apply(StateUpdate::new().with_analysis(Analysis::clear(0.9))).unwrap();
        assert_eq!(DrawingRouter::route(&state), "select_strategy");

        state.apply(StateUpdate::new().with_strategy(Strategy::ToolCall)).unwrap();
        assert_eq!(DrawingRouter::route(&state), "select_backend");

        state.apply(StateUpdate::new().with_backend(BackendKind::Vector)).unwrap();
        assert_eq!(DrawingRouter::route(&state), "execute_tool_call");

        state.apply(StateUpdate::new().with_artifact(ArtifactRef::new("vector/ab.svg"))).unwrap();
        assert_eq!(DrawingRouter::route(&state), END);
    }

    #[test]
    fn test_failed_run_ends() {
        let mut state = analysed(Analysis::ambiguous("which?", 0.2));
        state
            .apply(StateUpdate::new().with_error(crate::state::ErrorKind::AnalysisFailure, "x"))
            .unwrap();
        assert_eq!(DrawingRouter::route(&state), END);
    }
}
