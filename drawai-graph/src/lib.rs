//! # drawai-graph
//!
//! Graph-based workflow engine that turns a natural-language drawing request
//! into a rendered artifact.
//!
//! ## Overview
//!
//! A run threads one [`WorkflowState`] through a small graph of node roles:
//! `analyze`, `select_strategy`, `select_backend`, and one of the two
//! executors. Nodes return partial updates; the engine merges them, consults
//! the router and records a trace span per transition.
//!
//! ## Features
//!
//! - **Closed node set**: nodes are [`NodeRole`] variants, dispatched statically
//! - **Deterministic routing**: [`DrawingRouter`] applies a fixed predicate order
//! - **Human-in-the-loop**: ambiguous requests suspend with a serializable [`Checkpoint`]
//! - **Bounded execution**: step ceiling, tool-loop ceiling, per-call timeouts and retries
//! - **Cancellation**: checked between transitions and raced against in-flight calls
//! - **Streaming**: [`GraphEngine::stream`] yields progress events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drawai_graph::prelude::*;
//!
//! let engine = GraphEngine::new(drawing_graph()?, Services::new(reasoner, backends))
//!     .with_checkpointer(MemoryCheckpointer::new());
//!
//! match engine.run("run-1", WorkflowState::new("a red circle")).await? {
//!     Execution::Finished(state) => println!("{:?}", state.artifact_ref()),
//!     Execution::Suspended(checkpoint) => {
//!         let answer = ask(checkpoint.state.clarifying_question());
//!         engine.resume(checkpoint, &answer).await?;
//!     }
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod edge;
pub mod error;
pub mod executor;
pub mod graph;
pub mod interrupt;
pub mod node;
mod nodes;
pub mod retry;
pub mod state;
pub mod stream;
pub mod tool_loop;

pub use checkpoint::{Checkpointer, FileCheckpointer, MemoryCheckpointer};
pub use config::{CallPolicy, EngineConfig, ToolLoopConfig};
pub use edge::{DrawingRouter, END, Edge, EdgeTarget, Route, RouterFn, START, SUSPEND};
pub use error::{GraphError, Result};
pub use executor::{Execution, GraphEngine, PROMPT_CONFIDENCE_SCORE};
pub use graph::{CompiledGraph, StateGraph, drawing_graph};
pub use interrupt::InterruptController;
pub use node::{NodeContext, NodeOutput, NodeRole, NodeSignal, Services};
pub use retry::{Pacer, call_with_retry};
pub use state::{Checkpoint, ErrorKind, RunError, RunStatus, StateUpdate, WorkflowState};
pub use stream::StreamEvent;
pub use tool_loop::{LoopOutcome, ToolCallLoop};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checkpoint::{Checkpointer, FileCheckpointer, MemoryCheckpointer};
    pub use crate::config::{CallPolicy, EngineConfig};
    pub use crate::edge::{DrawingRouter, END, START, SUSPEND};
    pub use crate::error::{GraphError, Result};
    pub use crate::executor::{Execution, GraphEngine};
    pub use crate::graph::{CompiledGraph, StateGraph, drawing_graph};
    pub use crate::node::{NodeRole, Services};
    pub use crate::state::{Checkpoint, ErrorKind, RunStatus, WorkflowState};
    pub use crate::stream::StreamEvent;

    pub use drawai_core::{ArtifactRef, BackendKind, Strategy};
}
