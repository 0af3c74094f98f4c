//! # drawai-core
//!
//! Shared vocabulary of a DrawAI workflow: the decisions a run makes
//! ([`Strategy`], [`BackendKind`], [`Analysis`]), the calls it issues
//! ([`ToolCall`], [`NextAction`]), and the collaborator traits the engine talks
//! to ([`ReasoningService`], [`Backend`], [`BackendProvider`], [`TraceSink`]).

pub mod backend;
pub mod canvas;
pub mod error;
pub mod reasoning;
pub mod schema;
pub mod trace;
pub mod types;

pub use backend::{Backend, BackendProvider};
pub use canvas::CanvasConfig;
pub use error::{DrawError, Result};
pub use reasoning::ReasoningService;
pub use schema::{
    ArgKind, ArgSpec, Constraint, NAMED_COLORS, PrimitiveSchema, PrimitiveSpec, ValidationError,
    is_valid_color,
};
pub use trace::{NoopTraceSink, SpanOutcome, SpanRecord, TraceSink};
pub use types::{
    Analysis, ArtifactRef, BackendKind, CLARIFICATION_MARKER, NextAction, Strategy, ToolCall,
    ToolOutcome, ToolTraceEntry, append_clarification, split_clarification,
};
