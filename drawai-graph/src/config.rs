//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! step_limit = 25
//!
//! [tool_loop]
//! max_iterations = 24
//!
//! [calls]
//! timeout_ms = 30000
//! max_retries = 2
//!
//! [canvas]
//! width = 800
//! height = 800
//! ```

use crate::error::{GraphError, Result};
use drawai_core::CanvasConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STEP_LIMIT: usize = 25;
pub const DEFAULT_TOOL_ITERATIONS: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum node transitions per run, across suspensions.
    pub step_limit: usize,
    pub tool_loop: ToolLoopConfig,
    pub calls: CallPolicy,
    /// Drawing surface. Backend providers that report a canvas must match it.
    pub canvas: CanvasConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            tool_loop: ToolLoopConfig::default(),
            calls: CallPolicy::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GraphError::Config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_limit == 0 {
            return Err(GraphError::Config("step_limit must be at least 1".into()));
        }
        if self.tool_loop.max_iterations == 0 {
            return Err(GraphError::Config("tool_loop.max_iterations must be at least 1".into()));
        }
        if self.calls.timeout_ms == 0 {
            return Err(GraphError::Config("calls.timeout_ms must be at least 1".into()));
        }
        if !(self.calls.backoff_multiplier >= 1.0) {
            return Err(GraphError::Config("calls.backoff_multiplier must be >= 1.0".into()));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(GraphError::Config("canvas dimensions must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    #[must_use]
    pub fn with_tool_iterations(mut self, max_iterations: usize) -> Self {
        self.tool_loop.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_calls(mut self, calls: CallPolicy) -> Self {
        self.calls = calls;
        self
    }

    #[must_use]
    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolLoopConfig {
    /// Iteration ceiling; every iteration appends one trace entry.
    pub max_iterations: usize,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self { max_iterations: DEFAULT_TOOL_ITERATIONS }
    }
}

/// Timeout, retry and pacing policy for calls to the reasoning service and backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPolicy {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f32,
    /// Minimum spacing between reasoning calls of one run.
    pub min_interval_ms: u64,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 5_000,
            backoff_multiplier: 2.0,
            min_interval_ms: 0,
        }
    }
}

impl CallPolicy {
    /// No retries, no backoff, a generous timeout. Handy in tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self { max_retries: 0, initial_backoff_ms: 0, max_backoff_ms: 0, ..Self::default() }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff_ms = initial.as_millis() as u64;
        self.max_backoff_ms = max.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.step_limit, 25);
        assert_eq!(config.tool_loop.max_iterations, 24);
        assert_eq!(config.calls.max_retries, 2);
        assert_eq!(config.canvas.width, 800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            "step_limit = 10\n[tool_loop]\nmax_iterations = 5\n[canvas]\nwidth = 400\n",
        )
        .unwrap();
        assert_eq!(config.step_limit, 10);
        assert_eq!(config.tool_loop.max_iterations, 5);
        assert_eq!(config.canvas.width, 400);
        assert_eq!(config.canvas.height, 800);
        assert_eq!(config.calls.timeout_ms, 30_000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_toml_str("step_limit = 0").is_err());
        assert!(EngineConfig::from_toml_str("[calls]\nbackoff_multiplier = 0.5").is_err());
        assert!(EngineConfig::from_toml_str("step_limit = \"many\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default().with_step_limit(7);
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
