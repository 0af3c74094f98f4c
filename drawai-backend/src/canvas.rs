use crate::primitives::{Shape, standard_schema};
use crate::procedural::ProceduralRenderer;
use crate::raster::RasterRenderer;
use crate::renderer::Renderer;
use crate::vector::VectorRenderer;
use async_trait::async_trait;
use drawai_artifact::{ArtifactService, SaveRequest};
use drawai_core::{ArtifactRef, Backend, BackendKind, CanvasConfig, PrimitiveSchema, Result, ToolCall};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Backend that records shapes into a display list and renders it on finalize.
pub struct CanvasBackend<R: Renderer> {
    canvas: CanvasConfig,
    schema: PrimitiveSchema,
    shapes: Mutex<Vec<Shape>>,
    artifacts: Arc<dyn ArtifactService>,
    _renderer: PhantomData<R>,
}

pub type RasterBackend = CanvasBackend<RasterRenderer>;
pub type VectorBackend = CanvasBackend<VectorRenderer>;
pub type ProceduralBackend = CanvasBackend<ProceduralRenderer>;

impl<R: Renderer> CanvasBackend<R> {
    pub fn new(canvas: CanvasConfig, artifacts: Arc<dyn ArtifactService>) -> Self {
        let schema = standard_schema(&canvas);
        Self { canvas, schema, shapes: Mutex::new(Vec::new()), artifacts, _renderer: PhantomData }
    }

    /// Shapes drawn so far.
    pub async fn shapes(&self) -> Vec<Shape> {
        self.shapes.lock().await.clone()
    }

    /// Bytes `finalize` would store right now.
    pub async fn render(&self) -> Result<Vec<u8>> {
        let shapes = self.shapes.lock().await;
        R::render(&self.canvas, &shapes)
    }
}

#[async_trait]
impl<R: Renderer> Backend for CanvasBackend<R> {
    fn kind(&self) -> BackendKind {
        R::KIND
    }

    fn schema(&self) -> &PrimitiveSchema {
        &self.schema
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        self.schema.validate(call)?;
        let shape = Shape::from_call(call)?;
        let summary = shape.summary();
        self.shapes.lock().await.push(shape);
        drawai_telemetry::debug!(backend = %R::KIND, tool = %call.name, %summary, "primitive drawn");
        Ok(summary)
    }

    async fn finalize(&self) -> Result<ArtifactRef> {
        let bytes = self.render().await?;
        let count = self.shapes.lock().await.len();
        let saved = self.artifacts.save(SaveRequest::new(R::KIND, bytes)).await?;
        drawai_telemetry::info!(backend = %R::KIND, artifact = %saved.artifact_ref, shapes = count, "drawing finalized");
        Ok(saved.artifact_ref)
    }
}
