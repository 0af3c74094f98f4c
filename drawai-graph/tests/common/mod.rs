#![allow(dead_code)]

use async_trait::async_trait;
use drawai_artifact::InMemoryArtifactService;
use drawai_backend::{DefaultBackendProvider, standard_schema};
use drawai_core::{
    ArtifactRef, Backend, BackendKind, BackendProvider, CanvasConfig, DrawError,
    PrimitiveSchema, ReasoningService, ToolCall,
};
use drawai_graph::{CallPolicy, EngineConfig, GraphEngine, MemoryCheckpointer, Services, drawing_graph};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn fast_config() -> EngineConfig {
    EngineConfig::default().with_calls(CallPolicy::immediate().with_max_retries(2))
}

pub fn stock_provider() -> Arc<DefaultBackendProvider> {
    Arc::new(DefaultBackendProvider::new(
        CanvasConfig::default(),
        Arc::new(InMemoryArtifactService::new()),
    ))
}

pub fn engine_with(
    reasoner: Arc<dyn ReasoningService>,
    backends: Arc<dyn BackendProvider>,
) -> GraphEngine {
    GraphEngine::new(drawing_graph().unwrap(), Services::new(reasoner, backends))
        .with_config(fast_config())
        .with_checkpointer(MemoryCheckpointer::new())
}

pub fn circle(radius: i64) -> ToolCall {
    ToolCall::new("draw_circle")
        .with_arg("center_x", 400)
        .with_arg("center_y", 400)
        .with_arg("radius", radius)
        .with_arg("fill_color", "red")
}

/// Backend whose every primitive fails.
pub struct BrokenBackend {
    schema: PrimitiveSchema,
    pub attempts: Arc<AtomicU32>,
}

#[async_trait]
impl Backend for BrokenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn schema(&self) -> &PrimitiveSchema {
        &self.schema
    }

    async fn execute(&self, _call: &ToolCall) -> drawai_core::Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DrawError::Backend("canvas device lost".into()))
    }

    async fn finalize(&self) -> drawai_core::Result<ArtifactRef> {
        Err(DrawError::Backend("nothing to finalize".into()))
    }
}

/// Provider handing out [`BrokenBackend`]s and counting their attempts.
#[derive(Default)]
pub struct FlakyBackendProvider {
    pub attempts: Arc<AtomicU32>,
}

impl FlakyBackendProvider {
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendProvider for FlakyBackendProvider {
    async fn create(&self, _kind: BackendKind) -> drawai_core::Result<Arc<dyn Backend>> {
        Ok(Arc::new(BrokenBackend {
            schema: standard_schema(&CanvasConfig::default()),
            attempts: self.attempts.clone(),
        }))
    }

    fn schema_for(&self, _kind: BackendKind) -> PrimitiveSchema {
        standard_schema(&CanvasConfig::default())
    }
}
