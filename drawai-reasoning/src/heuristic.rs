//! Offline reasoning from keyword rules.
//!
//! Useful without network access and as a deterministic baseline: every
//! answer is a pure function of the request text.

use crate::compose::{compose, mentions};
use async_trait::async_trait;
use drawai_core::{
    Analysis, BackendKind, CanvasConfig, NextAction, PrimitiveSchema, ReasoningService, Result,
    Strategy, ToolCall, ToolTraceEntry, split_clarification,
};
use regex::Regex;
use std::sync::OnceLock;

pub const CLARIFYING_QUESTION: &str = "Could you be more specific about what you'd like me to draw?";

const VAGUE_WORDS: &[&str] = &["something", "anything", "cool", "nice", "random", "whatever"];

const SIMPLE_WORDS: &[&str] = &[
    "circle", "square", "rectangle", "triangle", "line", "dot", "oval", "ellipse", "star", "heart",
    "arrow", "cross", "plus", "minus",
];

const COMPLEX_WORDS: &[&str] = &[
    "scene", "landscape", "portrait", "house", "building", "person", "animal", "face", "tree",
    "forest", "city", "room", "garden", "ocean", "mountain", "detailed", "realistic", "complex",
    "multiple",
];

const PROCEDURAL_WORDS: &[&str] = &[
    "turtle", "animation", "step by step", "step-by-step", "educational", "learn", "teaching",
    "show how",
];

const VECTOR_WORDS: &[&str] = &[
    "svg", "vector", "scalable", "icon", "logo", "diagram", "geometric", "sharp", "crisp",
    "clean lines",
];

/// Requests shorter than this are too thin to draw from.
const MIN_WORDS: usize = 3;
/// Simple-shape requests shorter than this draw in one go. Undecided requests
/// at least this long are treated as compositions.
const SIMPLE_MAX_WORDS: usize = 10;

fn keyword_regex(words: &[&str]) -> Regex {
    let alternatives = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})(?:s|es)?\b")).expect("keyword pattern is valid")
}

macro_rules! keyword_matcher {
    ($fn_name:ident, $words:expr) => {
        fn $fn_name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| keyword_regex($words))
        }
    };
}

keyword_matcher!(vague, VAGUE_WORDS);
keyword_matcher!(simple, SIMPLE_WORDS);
keyword_matcher!(complex, COMPLEX_WORDS);
keyword_matcher!(procedural, PROCEDURAL_WORDS);
keyword_matcher!(vector, VECTOR_WORDS);

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicReasoner {
    canvas: CanvasConfig,
}

impl HeuristicReasoner {
    pub fn new(canvas: CanvasConfig) -> Self {
        Self { canvas }
    }

    /// Ambiguity judgment. After a clarification only the newest answer is
    /// checked for vague wording.
    pub fn analyze(&self, request: &str) -> Analysis {
        let (original, clarification) = split_clarification(request);
        let judged = clarification.unwrap_or(original);

        if vague().is_match(judged) || word_count(request) < MIN_WORDS {
            return Analysis::ambiguous(CLARIFYING_QUESTION, 0.3);
        }
        if mentions(request).is_empty() { Analysis::clear(0.7) } else { Analysis::clear(0.9) }
    }

    /// Scene vocabulary or several subjects need the tool loop, short
    /// simple-shape requests do not. Anything else is decided by length.
    pub fn strategy_for(&self, request: &str) -> Strategy {
        let words = word_count(request);
        if complex().is_match(request) || mentions(request).len() >= 2 {
            return Strategy::ToolCall;
        }
        if simple().is_match(request) && words < SIMPLE_MAX_WORDS {
            return Strategy::OneGo;
        }
        if words >= SIMPLE_MAX_WORDS { Strategy::ToolCall } else { Strategy::OneGo }
    }

    /// Procedural wording wins over vector wording.
    pub fn backend_for(&self, request: &str) -> BackendKind {
        if procedural().is_match(request) {
            BackendKind::Procedural
        } else if vector().is_match(request) {
            BackendKind::Vector
        } else {
            BackendKind::Raster
        }
    }

    pub fn plan(&self, request: &str) -> Vec<ToolCall> {
        compose(request, &self.canvas)
    }
}

#[async_trait]
impl ReasoningService for HeuristicReasoner {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify(&self, request: &str) -> Result<Analysis> {
        Ok(self.analyze(request))
    }

    async fn choose_strategy(&self, request: &str, _analysis: &Analysis) -> Result<Strategy> {
        Ok(self.strategy_for(request))
    }

    async fn choose_backend(&self, request: &str, _strategy: Strategy) -> Result<BackendKind> {
        Ok(self.backend_for(request))
    }

    async fn next_tool_call(
        &self,
        request: &str,
        trace: &[ToolTraceEntry],
        _schema: &PrimitiveSchema,
    ) -> Result<NextAction> {
        Ok(match self.plan(request).into_iter().nth(trace.len()) {
            Some(call) => NextAction::Call(call),
            None => NextAction::Finish,
        })
    }

    async fn plan_drawing(
        &self,
        request: &str,
        _backend: BackendKind,
        _schema: &PrimitiveSchema,
    ) -> Result<Vec<ToolCall>> {
        Ok(self.plan(request))
    }
}
