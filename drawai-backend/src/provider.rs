use crate::canvas::{ProceduralBackend, RasterBackend, VectorBackend};
use crate::primitives::standard_schema;
use async_trait::async_trait;
use drawai_artifact::ArtifactService;
use drawai_core::{Backend, BackendKind, BackendProvider, CanvasConfig, PrimitiveSchema, Result};
use std::sync::Arc;

/// Builds the stock raster, vector and procedural backends.
#[derive(Clone)]
pub struct DefaultBackendProvider {
    canvas: CanvasConfig,
    artifacts: Arc<dyn ArtifactService>,
}

impl DefaultBackendProvider {
    pub fn new(canvas: CanvasConfig, artifacts: Arc<dyn ArtifactService>) -> Self {
        Self { canvas, artifacts }
    }
}

#[async_trait]
impl BackendProvider for DefaultBackendProvider {
    async fn create(&self, kind: BackendKind) -> Result<Arc<dyn Backend>> {
        let canvas = self.canvas.clone();
        let artifacts = self.artifacts.clone();
        let backend: Arc<dyn Backend> = match kind {
            BackendKind::Raster => Arc::new(RasterBackend::new(canvas, artifacts)),
            BackendKind::Vector => Arc::new(VectorBackend::new(canvas, artifacts)),
            BackendKind::Procedural => Arc::new(ProceduralBackend::new(canvas, artifacts)),
        };
        Ok(backend)
    }

    fn schema_for(&self, _kind: BackendKind) -> PrimitiveSchema {
        standard_schema(&self.canvas)
    }

    fn canvas(&self) -> Option<&CanvasConfig> {
        Some(&self.canvas)
    }
}
