use drawai_core::{ArtifactRef, BackendKind, DrawError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Length of the digest prefix used in artifact refs.
pub const DIGEST_PREFIX_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub kind: BackendKind,
    pub bytes: Vec<u8>,
}

impl SaveRequest {
    pub fn new(kind: BackendKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self { kind, bytes: bytes.into() }
    }
}

#[derive(Debug, Clone)]
pub struct SaveResponse {
    pub artifact_ref: ArtifactRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadResponse {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

#[async_trait]
pub trait ArtifactService: Send + Sync {
    async fn save(&self, req: SaveRequest) -> Result<SaveResponse>;
    async fn load(&self, artifact_ref: &ArtifactRef) -> Result<LoadResponse>;
    async fn delete(&self, artifact_ref: &ArtifactRef) -> Result<()>;
    /// All stored refs, sorted.
    async fn list(&self) -> Result<Vec<ArtifactRef>>;
}

/// `<backend>/<sha256-prefix>.<ext>`; identical bytes always map to the same ref.
pub fn content_ref(kind: BackendKind, bytes: &[u8]) -> ArtifactRef {
    let digest = hex::encode(Sha256::digest(bytes));
    ArtifactRef::new(format!(
        "{}/{}.{}",
        kind.as_str(),
        &digest[..DIGEST_PREFIX_LEN],
        kind.file_extension()
    ))
}

/// Splits a ref into its backend and file name, rejecting anything path-like.
pub fn parse_ref(artifact_ref: &ArtifactRef) -> Result<(BackendKind, &str)> {
    let invalid = || DrawError::Artifact(format!("invalid artifact ref '{artifact_ref}'"));
    let (dir, file) = artifact_ref.as_str().split_once('/').ok_or_else(invalid)?;
    let kind = BackendKind::ALL.into_iter().find(|k| k.as_str() == dir).ok_or_else(invalid)?;

    if file.is_empty() || file.contains(['/', '\\']) || file.contains("..") {
        return Err(invalid());
    }
    Ok((kind, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_ref_is_stable() {
        let a = content_ref(BackendKind::Vector, b"<svg/>");
        let b = content_ref(BackendKind::Vector, b"<svg/>");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("vector/"));
        assert!(a.as_str().ends_with(".svg"));
        assert_ne!(a, content_ref(BackendKind::Vector, b"<svg></svg>"));
    }

    #[test]
    fn test_parse_ref_rejects_traversal() {
        assert!(parse_ref(&ArtifactRef::new("raster/../../etc")).is_err());
        assert!(parse_ref(&ArtifactRef::new("nope/abc.svg")).is_err());
        assert!(parse_ref(&ArtifactRef::new("vector")).is_err());

        let artifact_ref = ArtifactRef::new("procedural/ab12.turtle");
        let (kind, file) = parse_ref(&artifact_ref).unwrap();
        assert_eq!(kind, BackendKind::Procedural);
        assert_eq!(file, "ab12.turtle");
    }
}
