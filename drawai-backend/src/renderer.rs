use crate::primitives::Shape;
use drawai_core::{BackendKind, CanvasConfig, Result};

/// Turns a display list into the bytes of one artifact format.
pub trait Renderer: Send + Sync + 'static {
    const KIND: BackendKind;

    fn render(canvas: &CanvasConfig, shapes: &[Shape]) -> Result<Vec<u8>>;
}
