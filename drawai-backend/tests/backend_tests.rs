use drawai_artifact::{ArtifactService, InMemoryArtifactService};
use drawai_backend::DefaultBackendProvider;
use drawai_core::{BackendKind, BackendProvider, CanvasConfig, DrawError, ToolCall};
use std::sync::Arc;

fn provider() -> (DefaultBackendProvider, Arc<InMemoryArtifactService>) {
    let store = Arc::new(InMemoryArtifactService::new());
    (DefaultBackendProvider::new(CanvasConfig::default(), store.clone()), store)
}

fn red_circle() -> ToolCall {
    ToolCall::new("draw_circle")
        .with_arg("center_x", 400)
        .with_arg("center_y", 400)
        .with_arg("radius", 120)
        .with_arg("fill_color", "red")
}

#[tokio::test]
async fn each_kind_finalizes_to_its_own_format() {
    let (provider, store) = provider();

    for kind in BackendKind::ALL {
        let backend = provider.create(kind).await.unwrap();
        assert_eq!(backend.kind(), kind);
        backend.execute(&red_circle()).await.unwrap();

        let artifact_ref = backend.finalize().await.unwrap();
        assert!(artifact_ref.as_str().starts_with(kind.as_str()));
        assert!(artifact_ref.as_str().ends_with(kind.file_extension()));

        let loaded = store.load(&artifact_ref).await.unwrap();
        assert_eq!(loaded.mime_type, kind.mime_type());
    }
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn same_drawing_same_ref() {
    let (provider, _) = provider();

    let a = provider.create(BackendKind::Vector).await.unwrap();
    let b = provider.create(BackendKind::Vector).await.unwrap();
    a.execute(&red_circle()).await.unwrap();
    b.execute(&red_circle()).await.unwrap();

    assert_eq!(a.finalize().await.unwrap(), b.finalize().await.unwrap());
}

#[tokio::test]
async fn execute_rejects_invalid_calls() {
    let (provider, _) = provider();
    let backend = provider.create(BackendKind::Raster).await.unwrap();

    let err = backend.execute(&red_circle().with_arg("radius", 5000)).await.unwrap_err();
    assert!(matches!(err, DrawError::Validation(_)));
}

#[tokio::test]
async fn execute_reports_summary() {
    let (provider, _) = provider();
    let backend = provider.create(BackendKind::Procedural).await.unwrap();

    let summary = backend.execute(&red_circle()).await.unwrap();
    assert_eq!(summary, "red circle at (400, 400) radius 120");
}

#[test]
fn schema_for_matches_backend_schema() {
    let (provider, _) = provider();
    let schema = provider.schema_for(BackendKind::Vector);
    assert!(schema.get("draw_star").is_some());
    assert_eq!(schema.len(), 6);
}
