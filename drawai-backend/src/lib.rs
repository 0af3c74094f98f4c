//! # drawai-backend
//!
//! Rendering backends for DrawAI. All three accept the same primitive set
//! ([`standard_schema`]) and differ only in what `finalize` produces:
//!
//! - [`RasterBackend`]: a JSON pixel-space display list
//! - [`VectorBackend`]: an SVG document
//! - [`ProceduralBackend`]: a turtle command script

pub mod canvas;
pub mod primitives;
pub mod procedural;
pub mod provider;
pub mod raster;
pub mod renderer;
pub mod vector;

pub use canvas::{CanvasBackend, ProceduralBackend, RasterBackend, VectorBackend};
pub use primitives::{Shape, Style, standard_schema, star_vertices};
pub use procedural::ProceduralRenderer;
pub use provider::DefaultBackendProvider;
pub use raster::{RasterOp, RasterRenderer};
pub use renderer::Renderer;
pub use vector::VectorRenderer;
