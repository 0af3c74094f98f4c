use anyhow::{Context, Result};
use drawai_graph::EngineConfig;
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR_ENV: &str = "DRAWAI_OUTPUT_DIR";
pub const CHECKPOINT_DIR_ENV: &str = "DRAWAI_CHECKPOINT_DIR";
const DEFAULT_OUTPUT_DIR: &str = "drawai-output";

/// Everything the CLI needs to build a drawing service.
#[derive(Debug, Clone)]
pub struct Settings {
    pub engine: EngineConfig,
    pub output_dir: PathBuf,
    pub checkpoint_dir: PathBuf,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let engine = match config_path {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => EngineConfig::default(),
        };
        Ok(Self::from_parts(
            engine,
            std::env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from),
            std::env::var_os(CHECKPOINT_DIR_ENV).map(PathBuf::from),
        ))
    }

    fn from_parts(
        engine: EngineConfig,
        output_dir: Option<PathBuf>,
        checkpoint_dir: Option<PathBuf>,
    ) -> Self {
        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let checkpoint_dir = checkpoint_dir.unwrap_or_else(|| output_dir.join(".checkpoints"));
        Self { engine, output_dir, checkpoint_dir }
    }
}
