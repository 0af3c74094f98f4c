use crate::service::*;
use async_trait::async_trait;
use drawai_core::{ArtifactRef, BackendKind, DrawError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes artifacts below a root directory, one sub-directory per backend.
#[derive(Debug, Clone)]
pub struct LocalArtifactService {
    root: PathBuf,
}

impl LocalArtifactService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a stored artifact.
    pub fn path_of(&self, artifact_ref: &ArtifactRef) -> Result<PathBuf> {
        let (kind, file) = parse_ref(artifact_ref)?;
        Ok(self.root.join(kind.as_str()).join(file))
    }
}

#[async_trait]
impl ArtifactService for LocalArtifactService {
    async fn save(&self, req: SaveRequest) -> Result<SaveResponse> {
        let artifact_ref = content_ref(req.kind, &req.bytes);
        let path = self.path_of(&artifact_ref)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &req.bytes).await?;
        drawai_telemetry::debug!(artifact = %artifact_ref, path = %path.display(), bytes = req.bytes.len(), "artifact written");
        Ok(SaveResponse { artifact_ref })
    }

    async fn load(&self, artifact_ref: &ArtifactRef) -> Result<LoadResponse> {
        let (kind, _) = parse_ref(artifact_ref)?;
        let path = self.path_of(artifact_ref)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(LoadResponse { bytes, mime_type: kind.mime_type() }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DrawError::Artifact(format!("artifact not found: {artifact_ref}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, artifact_ref: &ArtifactRef) -> Result<()> {
        let path = self.path_of(artifact_ref)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<ArtifactRef>> {
        let mut refs = Vec::new();
        for kind in BackendKind::ALL {
            let dir = self.root.join(kind.as_str());
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                if let Some(name) = entry.file_name().to_str() {
                    refs.push(ArtifactRef::new(format!("{}/{}", kind.as_str(), name)));
                }
            }
        }
        refs.sort();
        Ok(refs)
    }
}
