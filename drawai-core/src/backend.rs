//! Rendering backend collaborator

use crate::canvas::CanvasConfig;
use crate::error::Result;
use crate::schema::PrimitiveSchema;
use crate::types::{ArtifactRef, BackendKind, ToolCall};
use async_trait::async_trait;
use std::sync::Arc;

/// One drawing surface for one run.
///
/// Implementations keep their canvas behind interior mutability so a call can
/// be retried through a shared reference.
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Primitives this backend accepts.
    fn schema(&self) -> &PrimitiveSchema;

    /// Apply one validated primitive and describe the result.
    async fn execute(&self, call: &ToolCall) -> Result<String>;

    /// Render everything drawn so far and persist it.
    async fn finalize(&self) -> Result<ArtifactRef>;
}

/// Creates a fresh backend per run.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    async fn create(&self, kind: BackendKind) -> Result<Arc<dyn Backend>>;

    /// Schema of the primitives the given backend will accept.
    fn schema_for(&self, kind: BackendKind) -> PrimitiveSchema;

    /// Canvas the created backends draw on, when the provider has a fixed one.
    fn canvas(&self) -> Option<&CanvasConfig> {
        None
    }
}
