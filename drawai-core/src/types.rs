use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Generation approach chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The whole drawing is planned in a single reasoning call.
    OneGo,
    /// The drawing is composed primitive by primitive.
    ToolCall,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneGo => "one_go",
            Self::ToolCall => "tool_call",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Raster,
    Vector,
    Procedural,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::Raster, Self::Vector, Self::Procedural];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
            Self::Procedural => "procedural",
        }
    }

    /// File extension of the artifacts this backend produces.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Raster => "raster.json",
            Self::Vector => "svg",
            Self::Procedural => "turtle",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Raster => "application/vnd.drawai.raster+json",
            Self::Vector => "image/svg+xml",
            Self::Procedural => "text/x-turtle-script",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judgment of how ambiguous a request is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub is_ambiguous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifying_question: Option<String>,
    /// Confidence in `[0, 1]` that the request is actionable as written.
    pub confidence: f32,
}

impl Analysis {
    /// A request that can be drawn as-is.
    pub fn clear(confidence: f32) -> Self {
        Self { is_ambiguous: false, clarifying_question: None, confidence: clamp_unit(confidence) }
    }

    /// A request that needs one more round of input before drawing.
    pub fn ambiguous(question: impl Into<String>, confidence: f32) -> Self {
        Self {
            is_ambiguous: true,
            clarifying_question: Some(question.into()),
            confidence: clamp_unit(confidence),
        }
    }

    /// The clarifying question, if it carries any text.
    pub fn question(&self) -> Option<&str> {
        self.clarifying_question.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Joins clarification text onto a request when a suspended run resumes.
pub const CLARIFICATION_MARKER: &str = ". Additional context: ";

/// `request` with `clarification` appended after [`CLARIFICATION_MARKER`].
pub fn append_clarification(request: &str, clarification: &str) -> String {
    let base = request.trim_end().trim_end_matches('.');
    format!("{base}{CLARIFICATION_MARKER}{}", clarification.trim())
}

/// Splits a request into its original text and the most recent clarification.
pub fn split_clarification(request: &str) -> (&str, Option<&str>) {
    match request.split_once(CLARIFICATION_MARKER) {
        Some((original, rest)) => {
            let latest = rest.rsplit(CLARIFICATION_MARKER).next().unwrap_or(rest);
            (original, Some(latest))
        }
        None => (request, None),
    }
}

/// A primitive-drawing call proposed by the reasoning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), arguments: Map::new() }
    }

    pub fn with_arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.to_string(), value.into());
        self
    }

    /// Integer argument, accepting integral floats as produced by some models.
    pub fn int_arg(&self, key: &str) -> Option<i64> {
        let value = self.arguments.get(key)?;
        value.as_i64().or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
    }

    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// What the reasoning service wants the tool loop to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    Call(ToolCall),
    Finish,
}

/// How a tool-loop iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Executed,
    ValidationFailed,
}

/// One record of the tool-call loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolTraceEntry {
    pub tool_name: String,
    pub arguments: Value,
    pub result_summary: String,
    pub outcome: ToolOutcome,
}

impl ToolTraceEntry {
    pub fn executed(call: &ToolCall, summary: impl Into<String>) -> Self {
        Self {
            tool_name: call.name.clone(),
            arguments: Value::Object(call.arguments.clone()),
            result_summary: summary.into(),
            outcome: ToolOutcome::Executed,
        }
    }

    pub fn rejected(call: &ToolCall, reason: impl Into<String>) -> Self {
        Self {
            tool_name: call.name.clone(),
            arguments: Value::Object(call.arguments.clone()),
            result_summary: reason.into(),
            outcome: ToolOutcome::ValidationFailed,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.outcome == ToolOutcome::ValidationFailed
    }
}

/// Opaque handle to a produced artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(serde_json::to_value(Strategy::OneGo).unwrap(), json!("one_go"));
        assert_eq!(serde_json::to_value(Strategy::ToolCall).unwrap(), json!("tool_call"));
        assert_eq!(Strategy::ToolCall.to_string(), "tool_call");
    }

    #[test]
    fn test_analysis_clamps_confidence() {
        assert_eq!(Analysis::clear(1.7).confidence, 1.0);
        assert_eq!(Analysis::ambiguous("what?", -0.2).confidence, 0.0);
        assert_eq!(Analysis::clear(f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_analysis_question_ignores_blank() {
        assert_eq!(Analysis::ambiguous("   ", 0.3).question(), None);
        assert_eq!(Analysis::ambiguous(" Which colour? ", 0.3).question(), Some("Which colour?"));
    }

    #[test]
    fn test_tool_call_int_arg_accepts_integral_floats() {
        let call = ToolCall::new("draw_circle").with_arg("radius", 12.0).with_arg("x", 4);
        assert_eq!(call.int_arg("radius"), Some(12));
        assert_eq!(call.int_arg("x"), Some(4));
        assert_eq!(call.int_arg("missing"), None);
    }

    #[test]
    fn test_clarification_round_trip() {
        let joined = append_clarification("draw something nice.", " a blue square ");
        assert_eq!(joined, "draw something nice. Additional context: a blue square");
        assert_eq!(split_clarification(&joined), ("draw something nice", Some("a blue square")));

        let twice = append_clarification(&joined, "make it big");
        assert_eq!(split_clarification(&twice), ("draw something nice", Some("make it big")));
        assert_eq!(split_clarification("a red circle"), ("a red circle", None));
    }

    #[test]
    fn test_next_action_tagging() {
        let action = NextAction::Call(ToolCall::new("draw_line"));
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], json!("call"));
        assert_eq!(serde_json::to_value(NextAction::Finish).unwrap(), json!({"action": "finish"}));
    }
}
