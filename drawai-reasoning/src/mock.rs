use async_trait::async_trait;
use drawai_core::{
    Analysis, BackendKind, DrawError, NextAction, PrimitiveSchema, ReasoningService, Result,
    Strategy, ToolCall, ToolTraceEntry,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Operations of [`ReasoningService`], for scripting failures and counting calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    Classify,
    ChooseStrategy,
    ChooseBackend,
    NextToolCall,
    PlanDrawing,
}

impl MockOp {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// Scripted reasoning service for tests.
///
/// Tool-loop answers are indexed by the length of the trace so the same
/// trace always yields the same answer.
pub struct MockReasoner {
    name: String,
    analysis: Analysis,
    strategy: Strategy,
    backend: BackendKind,
    script: Vec<NextAction>,
    endless: Option<ToolCall>,
    plan: Vec<ToolCall>,
    failures: [u32; MockOp::COUNT],
    delay: Option<Duration>,
    calls: [AtomicU32; MockOp::COUNT],
}

impl MockReasoner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analysis: Analysis::clear(1.0),
            strategy: Strategy::OneGo,
            backend: BackendKind::Raster,
            script: Vec::new(),
            endless: None,
            plan: Vec::new(),
            failures: [0; MockOp::COUNT],
            delay: None,
            calls: Default::default(),
        }
    }

    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Next tool-loop answer; the loop finishes once the script runs out.
    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.script.push(NextAction::Call(call));
        self
    }

    /// Never finish: keep proposing `call`.
    pub fn with_endless_calls(mut self, call: ToolCall) -> Self {
        self.endless = Some(call);
        self
    }

    pub fn with_plan(mut self, plan: Vec<ToolCall>) -> Self {
        self.plan = plan;
        self
    }

    /// Fail the first `times` calls of `op`. `u32::MAX` fails every call.
    pub fn with_failures(mut self, op: MockOp, times: u32) -> Self {
        self.failures[op.index()] = times;
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `op` was invoked.
    pub fn calls(&self, op: MockOp) -> u32 {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    async fn enter(&self, op: MockOp) -> Result<()> {
        let attempt = self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if attempt < self.failures[op.index()] {
            return Err(DrawError::Reasoning(format!("{op:?} unavailable (scripted failure)")));
        }
        Ok(())
    }
}

#[async_trait]
impl ReasoningService for MockReasoner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, _request: &str) -> Result<Analysis> {
        self.enter(MockOp::Classify).await?;
        Ok(self.analysis.clone())
    }

    async fn choose_strategy(&self, _request: &str, _analysis: &Analysis) -> Result<Strategy> {
        self.enter(MockOp::ChooseStrategy).await?;
        Ok(self.strategy)
    }

    async fn choose_backend(&self, _request: &str, _strategy: Strategy) -> Result<BackendKind> {
        self.enter(MockOp::ChooseBackend).await?;
        Ok(self.backend)
    }

    async fn next_tool_call(
        &self,
        _request: &str,
        trace: &[ToolTraceEntry],
        _schema: &PrimitiveSchema,
    ) -> Result<NextAction> {
        self.enter(MockOp::NextToolCall).await?;
        if let Some(call) = &self.endless {
            return Ok(NextAction::Call(call.clone()));
        }
        Ok(self.script.get(trace.len()).cloned().unwrap_or(NextAction::Finish))
    }

    async fn plan_drawing(
        &self,
        _request: &str,
        _backend: BackendKind,
        _schema: &PrimitiveSchema,
    ) -> Result<Vec<ToolCall>> {
        self.enter(MockOp::PlanDrawing).await?;
        Ok(self.plan.clone())
    }
}
