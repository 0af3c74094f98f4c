use crate::error::{Result, RunnerError};
use crate::outcome::RunOutcome;
use drawai_core::{BackendProvider, CanvasConfig, ReasoningService, TraceSink};
use drawai_graph::{
    Checkpointer, CompiledGraph, EngineConfig, Execution, GraphEngine, Services, WorkflowState,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct DrawingServiceConfig {
    pub graph: CompiledGraph,
    pub engine: EngineConfig,
    pub reasoner: Arc<dyn ReasoningService>,
    pub backends: Arc<dyn BackendProvider>,
    pub checkpointer: Arc<dyn Checkpointer>,
    pub trace: Option<Arc<dyn TraceSink>>,
}

/// Owns the compiled graph and collaborators; the public way to run drawings.
#[derive(Clone)]
pub struct DrawingService {
    engine: Arc<GraphEngine>,
    active: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

impl DrawingService {
    pub fn new(config: DrawingServiceConfig) -> Result<Self> {
        config.engine.validate()?;
        if let Some(canvas) = config.backends.canvas() {
            if *canvas != config.engine.canvas {
                return Err(RunnerError::CanvasMismatch {
                    engine: describe(&config.engine.canvas),
                    backend: describe(canvas),
                });
            }
        }
        let mut services = Services::new(config.reasoner, config.backends);
        if let Some(trace) = config.trace {
            services = services.with_trace(trace);
        }
        let engine = GraphEngine::new(config.graph, services)
            .with_config(config.engine)
            .with_checkpointer_arc(config.checkpointer);
        Ok(Self { engine: Arc::new(engine), active: Arc::new(Mutex::new(HashMap::new())) })
    }

    pub fn engine(&self) -> &GraphEngine {
        &self.engine
    }

    /// Start a run in the background.
    pub async fn submit(&self, request: &str) -> Result<RunHandle> {
        if request.trim().is_empty() {
            return Err(RunnerError::EmptyRequest);
        }
        let run_id = uuid::Uuid::new_v4().to_string();
        let cancel = self.register(&run_id).await?;
        let service = self.clone();
        let state = WorkflowState::new(request.trim());
        let task_id = run_id.clone();
        let task_cancel = cancel.clone();

        drawai_telemetry::info!(run.id = %run_id, "run submitted");
        let task = tokio::spawn(async move {
            let execution = service.engine.run_with_cancel(&task_id, state, &task_cancel).await;
            service.finish(&task_id, execution).await
        });
        Ok(RunHandle { run_id, cancel, task })
    }

    /// Submit and wait for the outcome.
    pub async fn draw(&self, request: &str) -> Result<RunOutcome> {
        self.submit(request).await?.outcome().await
    }

    /// Continue a suspended run with the user's clarification.
    ///
    /// Fails with [`RunnerError::RunActive`] while the run is still executing;
    /// the active run keeps its cancellation token.
    pub async fn resume(&self, run_id: &str, input: &str) -> Result<RunOutcome> {
        let cancel = self.register(run_id).await?;
        let execution = self.engine.resume_run(run_id, input, &cancel).await;
        self.finish(run_id, execution).await
    }

    /// Cancel an in-flight run. Returns whether the run was active.
    pub async fn cancel(&self, run_id: &str) -> bool {
        match self.active.lock().await.get(run_id) {
            Some(token) => {
                token.cancel();
                drawai_telemetry::info!(run.id = %run_id, "run cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Runs suspended and waiting for input.
    pub async fn pending_runs(&self) -> Result<Vec<String>> {
        match self.engine.checkpointer() {
            Some(store) => Ok(store.list().await?),
            None => Ok(Vec::new()),
        }
    }

    async fn register(&self, run_id: &str) -> Result<CancellationToken> {
        match self.active.lock().await.entry(run_id.to_string()) {
            Entry::Occupied(_) => Err(RunnerError::RunActive(run_id.to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(CancellationToken::new()).clone()),
        }
    }

    async fn finish(
        &self,
        run_id: &str,
        execution: drawai_graph::Result<Execution>,
    ) -> Result<RunOutcome> {
        self.active.lock().await.remove(run_id);
        let execution = execution?;
        Ok(RunOutcome::from_execution(run_id, &execution))
    }
}

fn describe(canvas: &CanvasConfig) -> String {
    format!("{}x{} on {}", canvas.width, canvas.height, canvas.background)
}

/// A submitted run.
pub struct RunHandle {
    run_id: String,
    cancel: CancellationToken,
    task: JoinHandle<Result<RunOutcome>>,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to finish or suspend.
    pub async fn outcome(self) -> Result<RunOutcome> {
        self.task.await.map_err(|e| RunnerError::Task(e.to_string()))?
    }
}
