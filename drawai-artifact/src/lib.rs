//! Storage for rendered drawings.
//!
//! Refs are content addressed: saving the same bytes for the same backend
//! twice yields the same [`ArtifactRef`](drawai_core::ArtifactRef).

pub mod inmemory;
pub mod local;
pub mod service;

pub use inmemory::InMemoryArtifactService;
pub use local::LocalArtifactService;
pub use service::{
    ArtifactService, DIGEST_PREFIX_LEN, LoadResponse, SaveRequest, SaveResponse, content_ref,
    parse_ref,
};
