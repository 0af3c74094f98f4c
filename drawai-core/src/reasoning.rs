//! Reasoning service collaborator
//!
//! The engine treats reasoning as a stateless, possibly failing function call.
//! Whether the answers come from a hosted model, local rules or a test script
//! is invisible to the workflow.

use crate::error::Result;
use crate::schema::PrimitiveSchema;
use crate::types::{Analysis, BackendKind, NextAction, Strategy, ToolCall, ToolTraceEntry};
use async_trait::async_trait;

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Identifier used in logs and trace records.
    fn name(&self) -> &str;

    /// Judge whether `request` is specific enough to draw.
    async fn classify(&self, request: &str) -> Result<Analysis>;

    async fn choose_strategy(&self, request: &str, analysis: &Analysis) -> Result<Strategy>;

    async fn choose_backend(&self, request: &str, strategy: Strategy) -> Result<BackendKind>;

    /// Propose the next primitive call, or finish.
    ///
    /// `trace` holds every earlier iteration of the current loop, including
    /// rejected calls, so the service can correct itself.
    async fn next_tool_call(
        &self,
        request: &str,
        trace: &[ToolTraceEntry],
        schema: &PrimitiveSchema,
    ) -> Result<NextAction>;

    /// Plan the whole drawing in a single call.
    async fn plan_drawing(
        &self,
        request: &str,
        backend: BackendKind,
        schema: &PrimitiveSchema,
    ) -> Result<Vec<ToolCall>>;
}
