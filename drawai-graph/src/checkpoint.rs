//! Checkpointing for suspended runs
//!
//! A store holds at most one checkpoint per run id. Resuming *takes* the
//! checkpoint, so a suspension can be resumed exactly once.

use crate::error::{GraphError, Result};
use crate::state::Checkpoint;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Checkpointer trait for persistence
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Store a checkpoint under its run id, replacing any previous one.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String>;

    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint>>;

    /// Remove and return the checkpoint for a run.
    async fn take(&self, run_id: &str) -> Result<Option<Checkpoint>>;

    async fn delete(&self, run_id: &str) -> Result<()>;

    /// Run ids currently awaiting input.
    async fn list(&self) -> Result<Vec<String>>;
}

/// In-memory checkpointer for development and testing
#[derive(Default, Clone)]
pub struct MemoryCheckpointer {
    checkpoints: Arc<RwLock<HashMap<String, Checkpoint>>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String> {
        let mut store = self.checkpoints.write().await;
        store.insert(checkpoint.run_id.clone(), checkpoint.clone());
        Ok(checkpoint.checkpoint_id.clone())
    }

    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.read().await.get(run_id).cloned())
    }

    async fn take(&self, run_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.write().await.remove(run_id))
    }

    async fn delete(&self, run_id: &str) -> Result<()> {
        self.checkpoints.write().await.remove(run_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.checkpoints.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One JSON file per run id under a directory. Lets a different process
/// resume a run suspended by this one.
#[derive(Debug, Clone)]
pub struct FileCheckpointer {
    root: PathBuf,
}

const EXTENSION: &str = "json";

impl FileCheckpointer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, run_id: &str) -> Result<PathBuf> {
        let valid = !run_id.is_empty()
            && run_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(GraphError::CheckpointError(format!("invalid run id '{run_id}'")));
        }
        Ok(self.root.join(format!("{run_id}.{EXTENSION}")))
    }

    async fn read(path: &Path) -> Result<Option<Checkpoint>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String> {
        let path = self.path_for(&checkpoint.run_id)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // Write then rename so readers never see a partial file.
        let staging = path.with_extension(format!("{EXTENSION}.tmp"));
        tokio::fs::write(&staging, serde_json::to_vec_pretty(checkpoint)?).await?;
        tokio::fs::rename(&staging, &path).await?;

        drawai_telemetry::debug!(run.id = %checkpoint.run_id, path = %path.display(), "checkpoint saved");
        Ok(checkpoint.checkpoint_id.clone())
    }

    async fn load(&self, run_id: &str) -> Result<Option<Checkpoint>> {
        Self::read(&self.path_for(run_id)?).await
    }

    async fn take(&self, run_id: &str) -> Result<Option<Checkpoint>> {
        let path = self.path_for(run_id)?;
        // Claim the file by renaming it; only one caller can win the rename.
        let claimed = path.with_extension(format!("{EXTENSION}.{}", uuid::Uuid::new_v4()));
        match tokio::fs::rename(&path, &claimed).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let checkpoint = Self::read(&claimed).await;
        tokio::fs::remove_file(&claimed).await?;
        checkpoint
    }

    async fn delete(&self, run_id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(run_id)?).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
