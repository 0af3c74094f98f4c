use crate::service::*;
use async_trait::async_trait;
use drawai_core::{ArtifactRef, DrawError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps artifacts in process memory. Meant for tests and one-shot runs.
#[derive(Default, Clone)]
pub struct InMemoryArtifactService {
    artifacts: Arc<RwLock<BTreeMap<ArtifactRef, Vec<u8>>>>,
}

impl InMemoryArtifactService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactService for InMemoryArtifactService {
    async fn save(&self, req: SaveRequest) -> Result<SaveResponse> {
        let artifact_ref = content_ref(req.kind, &req.bytes);
        self.artifacts.write().await.insert(artifact_ref.clone(), req.bytes);
        Ok(SaveResponse { artifact_ref })
    }

    async fn load(&self, artifact_ref: &ArtifactRef) -> Result<LoadResponse> {
        let (kind, _) = parse_ref(artifact_ref)?;
        let artifacts = self.artifacts.read().await;
        let bytes = artifacts
            .get(artifact_ref)
            .ok_or_else(|| DrawError::Artifact(format!("artifact not found: {artifact_ref}")))?;
        Ok(LoadResponse { bytes: bytes.clone(), mime_type: kind.mime_type() })
    }

    async fn delete(&self, artifact_ref: &ArtifactRef) -> Result<()> {
        self.artifacts.write().await.remove(artifact_ref);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ArtifactRef>> {
        Ok(self.artifacts.read().await.keys().cloned().collect())
    }
}
