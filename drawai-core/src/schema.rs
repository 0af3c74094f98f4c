//! Declared primitive schemas and call validation
//!
//! Every backend exposes the primitives it understands as a [`PrimitiveSchema`].
//! The tool-call loop validates each proposed [`ToolCall`] against that schema
//! before anything reaches the backend.

use crate::types::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// CSS colour names accepted by [`ArgKind::Color`] arguments.
pub const NAMED_COLORS: &[&str] = &[
    "black", "white", "red", "green", "blue", "yellow", "orange", "purple", "pink", "brown",
    "gray", "grey", "cyan", "magenta", "lime", "navy", "teal", "olive", "maroon", "silver",
    "gold", "skyblue", "darkgreen", "darkblue", "lightblue", "lightgreen", "beige", "tan",
    "violet", "indigo", "crimson", "coral", "salmon", "khaki", "turquoise", "transparent",
];

/// Type and validity range of one primitive argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgKind {
    /// Integer within an inclusive range.
    Integer { min: i64, max: i64 },
    /// Colour name from [`NAMED_COLORS`] or `#rgb` / `#rrggbb`.
    Color,
}

/// Declaration of one primitive argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl ArgSpec {
    pub fn int(name: &str, min: i64, max: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: ArgKind::Integer { min, max },
            required: true,
            description: String::new(),
        }
    }

    pub fn color(name: &str) -> Self {
        Self { name: name.to_string(), kind: ArgKind::Color, required: true, description: String::new() }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Constraint spanning more than one argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// `smaller` must be strictly less than `larger` when both are present.
    LessThan { smaller: String, larger: String },
}

/// Declaration of one drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl PrimitiveSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            args: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn less_than(mut self, smaller: &str, larger: &str) -> Self {
        self.constraints
            .push(Constraint::LessThan { smaller: smaller.to_string(), larger: larger.to_string() });
        self
    }

    fn arg_spec(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// Why a proposed call was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown primitive '{0}'")]
    UnknownPrimitive(String),

    #[error("{primitive}: missing required argument '{arg}'")]
    MissingArgument { primitive: String, arg: String },

    #[error("{primitive}: unexpected argument '{arg}'")]
    UnexpectedArgument { primitive: String, arg: String },

    #[error("{primitive}: argument '{arg}' must be {expected}")]
    WrongType { primitive: String, arg: String, expected: &'static str },

    #[error("{primitive}: argument '{arg}' = {value} is outside [{min}, {max}]")]
    OutOfRange { primitive: String, arg: String, value: i64, min: i64, max: i64 },

    #[error("{primitive}: argument '{arg}' has unrecognised colour '{value}'")]
    InvalidColor { primitive: String, arg: String, value: String },

    #[error("{primitive}: '{smaller}' must be less than '{larger}'")]
    ConstraintViolated { primitive: String, smaller: String, larger: String },
}

/// The set of primitives a backend accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSchema {
    primitives: BTreeMap<String, PrimitiveSpec>,
}

impl PrimitiveSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primitive(mut self, spec: PrimitiveSpec) -> Self {
        self.primitives.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PrimitiveSpec> {
        self.primitives.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.primitives.keys().map(String::as_str)
    }

    pub fn primitives(&self) -> impl Iterator<Item = &PrimitiveSpec> {
        self.primitives.values()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Check a call against the declared schema without executing it.
    pub fn validate(&self, call: &ToolCall) -> Result<(), ValidationError> {
        let spec = self
            .primitives
            .get(&call.name)
            .ok_or_else(|| ValidationError::UnknownPrimitive(call.name.clone()))?;

        for name in call.arguments.keys() {
            if spec.arg_spec(name).is_none() {
                return Err(ValidationError::UnexpectedArgument {
                    primitive: spec.name.clone(),
                    arg: name.clone(),
                });
            }
        }

        for arg in &spec.args {
            match call.arguments.get(&arg.name) {
                None | Some(Value::Null) => {
                    if arg.required {
                        return Err(ValidationError::MissingArgument {
                            primitive: spec.name.clone(),
                            arg: arg.name.clone(),
                        });
                    }
                }
                Some(value) => validate_value(&spec.name, arg, value)?,
            }
        }

        for constraint in &spec.constraints {
            match constraint {
                Constraint::LessThan { smaller, larger } => {
                    if let (Some(a), Some(b)) = (call.int_arg(smaller), call.int_arg(larger)) {
                        if a >= b {
                            return Err(ValidationError::ConstraintViolated {
                                primitive: spec.name.clone(),
                                smaller: smaller.clone(),
                                larger: larger.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_value(primitive: &str, arg: &ArgSpec, value: &Value) -> Result<(), ValidationError> {
    match &arg.kind {
        ArgKind::Integer { min, max } => {
            let number = value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                .ok_or_else(|| ValidationError::WrongType {
                    primitive: primitive.to_string(),
                    arg: arg.name.clone(),
                    expected: "an integer",
                })?;
            if number < *min || number > *max {
                return Err(ValidationError::OutOfRange {
                    primitive: primitive.to_string(),
                    arg: arg.name.clone(),
                    value: number,
                    min: *min,
                    max: *max,
                });
            }
            Ok(())
        }
        ArgKind::Color => {
            let text = value.as_str().ok_or_else(|| ValidationError::WrongType {
                primitive: primitive.to_string(),
                arg: arg.name.clone(),
                expected: "a colour string",
            })?;
            if is_valid_color(text) {
                Ok(())
            } else {
                Err(ValidationError::InvalidColor {
                    primitive: primitive.to_string(),
                    arg: arg.name.clone(),
                    value: text.to_string(),
                })
            }
        }
    }
}

/// Accepts CSS names from [`NAMED_COLORS`] and `#rgb` / `#rrggbb` hex codes.
pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    NAMED_COLORS.iter().any(|name| name.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_schema() -> PrimitiveSchema {
        PrimitiveSchema::new().with_primitive(
            PrimitiveSpec::new("draw_circle", "circle")
                .arg(ArgSpec::int("center_x", 0, 100))
                .arg(ArgSpec::int("center_y", 0, 100))
                .arg(ArgSpec::int("radius", 1, 100))
                .arg(ArgSpec::color("fill_color").optional()),
        )
    }

    #[test]
    fn test_valid_call_passes() {
        let call = ToolCall::new("draw_circle")
            .with_arg("center_x", 50)
            .with_arg("center_y", 50)
            .with_arg("radius", 10)
            .with_arg("fill_color", "#ff0000");
        assert_eq!(circle_schema().validate(&call), Ok(()));
    }

    #[test]
    fn test_unknown_primitive() {
        let call = ToolCall::new("draw_blob");
        assert_eq!(
            circle_schema().validate(&call),
            Err(ValidationError::UnknownPrimitive("draw_blob".to_string()))
        );
    }

    #[test]
    fn test_out_of_range() {
        let call = ToolCall::new("draw_circle")
            .with_arg("center_x", 50)
            .with_arg("center_y", 50)
            .with_arg("radius", 500);
        assert!(matches!(
            circle_schema().validate(&call),
            Err(ValidationError::OutOfRange { value: 500, max: 100, .. })
        ));
    }

    #[test]
    fn test_missing_and_unexpected_arguments() {
        let missing = ToolCall::new("draw_circle").with_arg("center_x", 1).with_arg("center_y", 1);
        assert!(matches!(
            circle_schema().validate(&missing),
            Err(ValidationError::MissingArgument { .. })
        ));

        let extra = ToolCall::new("draw_circle")
            .with_arg("center_x", 1)
            .with_arg("center_y", 1)
            .with_arg("radius", 1)
            .with_arg("opacity", 1);
        assert!(matches!(
            circle_schema().validate(&extra),
            Err(ValidationError::UnexpectedArgument { .. })
        ));
    }

    #[test]
    fn test_null_optional_is_absent() {
        let call = ToolCall::new("draw_circle")
            .with_arg("center_x", 1)
            .with_arg("center_y", 1)
            .with_arg("radius", 1)
            .with_arg("fill_color", Value::Null);
        assert_eq!(circle_schema().validate(&call), Ok(()));
    }

    #[test]
    fn test_less_than_constraint() {
        let schema = PrimitiveSchema::new().with_primitive(
            PrimitiveSpec::new("draw_star", "star")
                .arg(ArgSpec::int("outer_radius", 1, 100))
                .arg(ArgSpec::int("inner_radius", 1, 100))
                .less_than("inner_radius", "outer_radius"),
        );
        let call = ToolCall::new("draw_star").with_arg("outer_radius", 10).with_arg("inner_radius", 10);
        assert!(matches!(schema.validate(&call), Err(ValidationError::ConstraintViolated { .. })));
    }

    #[test]
    fn test_color_forms() {
        assert!(is_valid_color("Red"));
        assert!(is_valid_color("#0f0"));
        assert!(is_valid_color("#00ff00"));
        assert!(!is_valid_color("#00ff0"));
        assert!(!is_valid_color("rainbow"));
    }
}
