//! StateGraph builder and the compiled, validated graph

use crate::edge::{DrawingRouter, Edge, EdgeTarget, END, Route, RouterFn, START, SUSPEND};
use crate::error::{GraphError, Result};
use crate::node::NodeRole;
use crate::state::WorkflowState;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Builder for a workflow graph over the closed set of [`NodeRole`]s.
#[derive(Default)]
pub struct StateGraph {
    nodes: BTreeMap<String, NodeRole>,
    edges: Vec<Edge>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node role under its canonical name.
    pub fn add_node(mut self, role: NodeRole) -> Self {
        self.nodes.insert(role.name().to_string(), role);
        self
    }

    /// Add a direct edge from source to target
    pub fn add_edge(mut self, source: &str, target: &str) -> Self {
        if source == START {
            self.edges.push(Edge::Entry { target: target.to_string() });
        } else {
            self.edges
                .push(Edge::Direct { source: source.to_string(), target: EdgeTarget::from(target) });
        }
        self
    }

    /// Add a conditional edge with a router function
    pub fn add_conditional_edges<F, I>(self, source: &str, router: F, targets: I) -> Self
    where
        F: Fn(&WorkflowState) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        self.add_conditional_edges_arc(source, Arc::new(router), targets)
    }

    pub fn add_conditional_edges_arc<I>(mut self, source: &str, router: RouterFn, targets: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let targets =
            targets.into_iter().map(|(k, v)| (k.to_string(), EdgeTarget::from(v))).collect();
        self.edges.push(Edge::Conditional { source: source.to_string(), router, targets });
        self
    }

    /// Validate and compile the graph for execution
    pub fn compile(self) -> Result<CompiledGraph> {
        self.validate()?;

        let mut entry = None;
        let mut outgoing = HashMap::new();
        for edge in self.edges {
            match edge {
                Edge::Entry { target } => entry = self.nodes.get(&target).copied(),
                other => {
                    if let Some(role) = self.nodes.get(other.source()).copied() {
                        outgoing.insert(role, other);
                    }
                }
            }
        }
        let entry = entry.ok_or(GraphError::NoEntryPoint)?;

        Ok(CompiledGraph { nodes: self.nodes, entry, outgoing })
    }

    fn validate(&self) -> Result<()> {
        let entries: Vec<&Edge> =
            self.edges.iter().filter(|e| matches!(e, Edge::Entry { .. })).collect();
        match entries.len() {
            0 => return Err(GraphError::NoEntryPoint),
            1 => {}
            n => return Err(GraphError::InvalidGraph(format!("{n} entry edges; runs are sequential"))),
        }

        for (name, role) in &self.nodes {
            if name != role.name() {
                return Err(GraphError::InvalidGraph(format!(
                    "node '{name}' registered for role '{role}'"
                )));
            }
        }

        let check_target = |target: &EdgeTarget| match target {
            EdgeTarget::Node(name) if !self.nodes.contains_key(name) => {
                Err(GraphError::EdgeTargetNotFound(name.clone()))
            }
            _ => Ok(()),
        };

        let mut sources = HashSet::new();
        for edge in &self.edges {
            match edge {
                Edge::Entry { target } => {
                    if !self.nodes.contains_key(target) {
                        return Err(GraphError::EdgeTargetNotFound(target.clone()));
                    }
                }
                Edge::Direct { source, target } => {
                    if !self.nodes.contains_key(source) {
                        return Err(GraphError::NodeNotFound(source.clone()));
                    }
                    check_target(target)?;
                }
                Edge::Conditional { source, targets, .. } => {
                    if !self.nodes.contains_key(source) {
                        return Err(GraphError::NodeNotFound(source.clone()));
                    }
                    if targets.is_empty() {
                        return Err(GraphError::InvalidGraph(format!(
                            "conditional edge from '{source}' declares no targets"
                        )));
                    }
                    for target in targets.values() {
                        check_target(target)?;
                    }
                }
            }
            if !matches!(edge, Edge::Entry { .. }) && !sources.insert(edge.source().to_string()) {
                return Err(GraphError::InvalidGraph(format!(
                    "node '{}' has more than one outgoing edge",
                    edge.source()
                )));
            }
        }

        Ok(())
    }
}

/// A validated graph, ready to be driven by the engine.
pub struct CompiledGraph {
    nodes: BTreeMap<String, NodeRole>,
    entry: NodeRole,
    outgoing: HashMap<NodeRole, Edge>,
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("entry", &self.entry)
            .finish()
    }
}

impl CompiledGraph {
    pub fn entry(&self) -> NodeRole {
        self.entry
    }

    pub fn node(&self, name: &str) -> Option<NodeRole> {
        self.nodes.get(name).copied()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Successor of `current` for the given state.
    ///
    /// Fails with a description when the node has no outgoing edge or a
    /// router returns a route that was not declared.
    pub fn next(&self, current: NodeRole, state: &WorkflowState) -> std::result::Result<Route, String> {
        let edge = self
            .outgoing
            .get(&current)
            .ok_or_else(|| format!("node '{current}' has no outgoing edge"))?;

        let target = match edge {
            Edge::Direct { target, .. } => target,
            Edge::Conditional { router, targets, .. } => {
                let route = router(state);
                targets.get(&route).ok_or_else(|| {
                    format!("router for '{current}' returned undeclared target '{route}'")
                })?
            }
            Edge::Entry { .. } => return Err("entry edge has no source node".to_string()),
        };

        Ok(match target {
            EdgeTarget::End => Route::End,
            EdgeTarget::Suspend => Route::Suspend,
            EdgeTarget::Node(name) => Route::Node(
                self.node(name).ok_or_else(|| format!("unknown node '{name}'"))?,
            ),
        })
    }
}

/// The standard drawing workflow:
///
/// ```text
/// START -> analyze -> select_strategy -> select_backend -> execute_one_go    -> END
///             |                                       \-> execute_tool_call -> END
///             \-> (suspend for clarification)
/// ```
pub fn drawing_graph() -> Result<CompiledGraph> {
    StateGraph::new()
        .add_node(NodeRole::Analyze)
        .add_node(NodeRole::SelectStrategy)
        .add_node(NodeRole::SelectBackend)
        .add_node(NodeRole::ExecuteOneGo)
        .add_node(NodeRole::ExecuteToolCall)
        .add_edge(START, "analyze")
        .add_conditional_edges(
            "analyze",
            DrawingRouter::route,
            [("select_strategy", "select_strategy"), (SUSPEND, SUSPEND), (END, END)],
        )
        .add_edge("select_strategy", "select_backend")
        .add_conditional_edges(
            "select_backend",
            DrawingRouter::route,
            [("execute_one_go", "execute_one_go"), ("execute_tool_call", "execute_tool_call"), (END, END)],
        )
        .add_edge("execute_one_go", END)
        .add_edge("execute_tool_call", END)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use drawai_core::{Analysis, BackendKind, Strategy};

    #[test]
    fn test_missing_entry_point() {
        let graph = StateGraph::new().add_node(NodeRole::Analyze).add_edge("analyze", END).compile();
        assert!(matches!(graph, Err(GraphError::NoEntryPoint)));
    }

    #[test]
    fn test_unknown_edge_target() {
        let graph = StateGraph::new()
            .add_node(NodeRole::Analyze)
            .add_edge(START, "analyze")
            .add_edge("analyze", "select_strategy")
            .compile();
        assert!(matches!(graph, Err(GraphError::EdgeTargetNotFound(name)) if name == "select_strategy"));
    }

    #[test]
    fn test_duplicate_outgoing_edges_rejected() {
        let graph = StateGraph::new()
            .add_node(NodeRole::Analyze)
            .add_edge(START, "analyze")
            .add_edge("analyze", END)
            .add_edge("analyze", SUSPEND)
            .compile();
        assert!(matches!(graph, Err(GraphError::InvalidGraph(_))));
    }

    #[test]
    fn test_drawing_graph_routes() {
        let graph = drawing_graph().unwrap();
        assert_eq!(graph.entry(), NodeRole::Analyze);
        assert_eq!(graph.node_names().count(), 5);

        let mut state = WorkflowState::new("a red circle");
        state.apply(StateUpdate::new().with_analysis(Analysis::clear(0.9))).unwrap();
        assert_eq!(graph.next(NodeRole::Analyze, &state), Ok(Route::Node(NodeRole::SelectStrategy)));

        state.apply(StateUpdate::new().with_strategy(Strategy::OneGo)).unwrap();
        assert_eq!(
            graph.next(NodeRole::SelectStrategy, &state),
            Ok(Route::Node(NodeRole::SelectBackend))
        );

        state.apply(StateUpdate::new().with_backend(BackendKind::Raster)).unwrap();
        assert_eq!(graph.next(NodeRole::SelectBackend, &state), Ok(Route::Node(NodeRole::ExecuteOneGo)));
        assert_eq!(graph.next(NodeRole::ExecuteOneGo, &state), Ok(Route::End));
    }

    #[test]
    fn test_undeclared_route_is_reported() {
        let graph = StateGraph::new()
            .add_node(NodeRole::Analyze)
            .add_edge(START, "analyze")
            .add_conditional_edges("analyze", |_: &WorkflowState| "elsewhere".to_string(), [(END, END)])
            .compile()
            .unwrap();
        let err = graph.next(NodeRole::Analyze, &WorkflowState::new("x")).unwrap_err();
        assert!(err.contains("elsewhere"));
    }
}
