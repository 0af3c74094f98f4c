use drawai_artifact::{ArtifactService, InMemoryArtifactService, LocalArtifactService};
use drawai_backend::DefaultBackendProvider;
use drawai_core::{CanvasConfig, ReasoningService};
use drawai_graph::{
    CallPolicy, Checkpointer, EngineConfig, ErrorKind, FileCheckpointer, MemoryCheckpointer,
    RunStatus, drawing_graph,
};
use drawai_reasoning::{HeuristicReasoner, MockReasoner};
use drawai_runner::{DrawingService, DrawingServiceConfig, RunnerError};
use std::sync::Arc;
use std::time::Duration;

fn service_with(
    reasoner: Arc<dyn ReasoningService>,
    artifacts: Arc<dyn ArtifactService>,
    checkpointer: Arc<dyn Checkpointer>,
) -> DrawingService {
    DrawingService::new(DrawingServiceConfig {
        graph: drawing_graph().unwrap(),
        engine: EngineConfig::default().with_calls(CallPolicy::immediate()),
        reasoner,
        backends: Arc::new(DefaultBackendProvider::new(CanvasConfig::default(), artifacts)),
        checkpointer,
        trace: None,
    })
    .unwrap()
}

fn heuristic_service() -> DrawingService {
    service_with(
        Arc::new(HeuristicReasoner::default()),
        Arc::new(InMemoryArtifactService::new()),
        Arc::new(MemoryCheckpointer::new()),
    )
}

#[tokio::test]
async fn draw_completes_with_an_artifact() {
    let outcome = heuristic_service().draw("a red circle").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    assert!(outcome.artifact_ref.is_some());
    assert!(outcome.error.is_none());
    assert!(uuid::Uuid::parse_str(&outcome.run_id).is_ok());
}

#[tokio::test]
async fn suspended_run_is_listed_and_resumable() {
    let service = heuristic_service();
    let outcome = service.draw("draw something nice").await.unwrap();

    assert!(outcome.is_awaiting_input());
    assert!(outcome.clarifying_question.is_some());
    assert!(outcome.artifact_ref.is_none());
    assert_eq!(service.pending_runs().await.unwrap(), vec![outcome.run_id.clone()]);

    let resumed = service.resume(&outcome.run_id, "a blue square").await.unwrap();
    assert!(resumed.is_completed());
    assert_eq!(resumed.run_id, outcome.run_id);
    assert!(service.pending_runs().await.unwrap().is_empty());
}

#[tokio::test]
async fn resume_of_unknown_run_is_an_error() {
    let err = heuristic_service().resume("no-such-run", "a blue square").await.unwrap_err();
    assert!(matches!(err, RunnerError::Graph(drawai_graph::GraphError::CheckpointNotFound(_))));
}

#[tokio::test]
async fn empty_requests_are_rejected() {
    assert!(matches!(heuristic_service().draw("   ").await, Err(RunnerError::EmptyRequest)));
}

#[tokio::test]
async fn another_service_instance_can_resume_from_disk() {
    let checkpoints = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let build = || {
        service_with(
            Arc::new(HeuristicReasoner::default()),
            Arc::new(LocalArtifactService::new(output.path())),
            Arc::new(FileCheckpointer::new(checkpoints.path())),
        )
    };

    let first = build();
    let outcome = first.draw("something").await.unwrap();
    assert!(outcome.is_awaiting_input());
    drop(first);

    let second = build();
    let resumed = second.resume(&outcome.run_id, "a yellow star").await.unwrap();
    assert!(resumed.is_completed());
    let artifact = resumed.artifact_ref.unwrap();
    let stored = LocalArtifactService::new(output.path()).path_of(&artifact).unwrap();
    assert!(stored.exists());
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_an_in_flight_run() {
    let service = service_with(
        Arc::new(MockReasoner::new("slow").with_delay(Duration::from_secs(5))),
        Arc::new(InMemoryArtifactService::new()),
        Arc::new(MemoryCheckpointer::new()),
    );

    let handle = service.submit("a red circle").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(service.cancel(handle.run_id()).await);

    let outcome = handle.outcome().await.unwrap();
    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::Cancelled);
    assert!(!service.cancel("never-started").await);
}

#[tokio::test(start_paused = true)]
async fn resume_of_an_active_run_keeps_it_cancellable() {
    let service = service_with(
        Arc::new(MockReasoner::new("slow").with_delay(Duration::from_secs(5))),
        Arc::new(InMemoryArtifactService::new()),
        Arc::new(MemoryCheckpointer::new()),
    );

    let handle = service.submit("a red circle").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = service.resume(handle.run_id(), "a blue square").await.unwrap_err();
    assert!(matches!(err, RunnerError::RunActive(ref id) if id == handle.run_id()));
    assert!(service.cancel(handle.run_id()).await);

    let outcome = handle.outcome().await.unwrap();
    assert_eq!(outcome.status, RunStatus::Failed);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::Cancelled);
}

#[test]
fn provider_canvas_must_match_the_engine_canvas() {
    let artifacts: Arc<dyn ArtifactService> = Arc::new(InMemoryArtifactService::new());
    let result = DrawingService::new(DrawingServiceConfig {
        graph: drawing_graph().unwrap(),
        engine: EngineConfig::default().with_canvas(CanvasConfig::default().with_size(320, 240)),
        reasoner: Arc::new(HeuristicReasoner::default()),
        backends: Arc::new(DefaultBackendProvider::new(CanvasConfig::default(), artifacts)),
        checkpointer: Arc::new(MemoryCheckpointer::new()),
        trace: None,
    });

    match result {
        Err(RunnerError::CanvasMismatch { engine, backend }) => {
            assert!(engine.starts_with("320x240"));
            assert!(backend.starts_with("800x800"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("mismatched canvas was accepted"),
    }
}
