use serde::{Deserialize, Serialize};

/// Drawing surface shared by every backend of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: 800, height: 800, background: "white".to_string() }
    }
}

impl CanvasConfig {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// The larger of the two dimensions; bounds radii and sizes.
    pub fn extent(&self) -> u32 {
        self.width.max(self.height)
    }
}
