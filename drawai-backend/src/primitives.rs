//! The drawing primitives every backend accepts, and their parsed form.

use drawai_core::{
    ArgSpec, CanvasConfig, DrawError, PrimitiveSchema, PrimitiveSpec, Result, ToolCall,
    ValidationError,
};
use serde::{Deserialize, Serialize};

pub const MAX_STROKE_WIDTH: i64 = 50;
pub const MIN_ANGLE: i64 = -360;
pub const MAX_ANGLE: i64 = 720;
pub const MIN_STAR_POINTS: i64 = 3;
pub const MAX_STAR_POINTS: i64 = 24;

/// Primitive schema sized to `canvas`.
pub fn standard_schema(canvas: &CanvasConfig) -> PrimitiveSchema {
    let w = i64::from(canvas.width);
    let h = i64::from(canvas.height);
    let extent = i64::from(canvas.extent()).max(1);

    let x = |name: &str| ArgSpec::int(name, 0, w);
    let y = |name: &str| ArgSpec::int(name, 0, h);
    let size = |name: &str| ArgSpec::int(name, 1, extent);
    let stroke_width = || ArgSpec::int("stroke_width", 0, MAX_STROKE_WIDTH).optional();
    let fill = || ArgSpec::color("fill_color").optional().describe("omit for no fill");
    let stroke = || ArgSpec::color("stroke_color").optional().describe("omit for no outline");

    PrimitiveSchema::new()
        .with_primitive(
            PrimitiveSpec::new("draw_line", "Straight line between two points.")
                .arg(x("x1"))
                .arg(y("y1"))
                .arg(x("x2"))
                .arg(y("y2"))
                .arg(ArgSpec::color("color").optional().describe("defaults to black"))
                .arg(ArgSpec::int("width", 0, MAX_STROKE_WIDTH).optional()),
        )
        .with_primitive(
            PrimitiveSpec::new(
                "draw_arc",
                "Portion of a circle; 0 degrees is 3 o'clock, angles increase counter-clockwise.",
            )
            .arg(x("center_x"))
            .arg(y("center_y"))
            .arg(size("radius"))
            .arg(ArgSpec::int("start_angle", MIN_ANGLE, MAX_ANGLE))
            .arg(ArgSpec::int("end_angle", MIN_ANGLE, MAX_ANGLE))
            .arg(ArgSpec::color("color").optional().describe("defaults to black"))
            .arg(ArgSpec::int("width", 0, MAX_STROKE_WIDTH).optional()),
        )
        .with_primitive(
            PrimitiveSpec::new("draw_circle", "Circle with optional fill and outline.")
                .arg(x("center_x"))
                .arg(y("center_y"))
                .arg(size("radius"))
                .arg(fill())
                .arg(stroke())
                .arg(stroke_width()),
        )
        .with_primitive(
            PrimitiveSpec::new("draw_triangle", "Triangle through three vertices.")
                .arg(x("x1"))
                .arg(y("y1"))
                .arg(x("x2"))
                .arg(y("y2"))
                .arg(x("x3"))
                .arg(y("y3"))
                .arg(fill())
                .arg(stroke())
                .arg(stroke_width()),
        )
        .with_primitive(
            PrimitiveSpec::new("draw_rectangle", "Rectangle from its top-left corner.")
                .arg(x("x"))
                .arg(y("y"))
                .arg(size("width"))
                .arg(size("height"))
                .arg(fill())
                .arg(stroke())
                .arg(stroke_width()),
        )
        .with_primitive(
            PrimitiveSpec::new("draw_star", "Star from its center, radii and point count.")
                .arg(x("center_x"))
                .arg(y("center_y"))
                .arg(size("outer_radius"))
                .arg(size("inner_radius"))
                .arg(ArgSpec::int("points", MIN_STAR_POINTS, MAX_STAR_POINTS))
                .arg(fill())
                .arg(stroke())
                .arg(stroke_width())
                .less_than("inner_radius", "outer_radius"),
        )
}

/// Fill and outline of a closed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    pub stroke_width: i64,
}

impl Style {
    fn from_call(call: &ToolCall) -> Self {
        Self {
            fill: opt_color(call, "fill_color"),
            stroke: opt_color(call, "stroke_color"),
            stroke_width: call.int_arg("stroke_width").unwrap_or(1),
        }
    }

    /// Outline colour when an outline is actually drawn.
    pub fn visible_stroke(&self) -> Option<&str> {
        self.stroke.as_deref().filter(|_| self.stroke_width > 0)
    }
}

/// A validated primitive, in canvas coordinates (y grows downwards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Line { x1: i64, y1: i64, x2: i64, y2: i64, color: String, width: i64 },
    Arc { center_x: i64, center_y: i64, radius: i64, start_angle: i64, end_angle: i64, color: String, width: i64 },
    Circle { center_x: i64, center_y: i64, radius: i64, style: Style },
    Triangle { points: [(i64, i64); 3], style: Style },
    Rectangle { x: i64, y: i64, width: i64, height: i64, style: Style },
    Star { center_x: i64, center_y: i64, outer_radius: i64, inner_radius: i64, points: i64, style: Style },
}

impl Shape {
    /// Parse a call that already passed schema validation.
    pub fn from_call(call: &ToolCall) -> Result<Self> {
        let shape = match call.name.as_str() {
            "draw_line" => Self::Line {
                x1: req(call, "x1")?,
                y1: req(call, "y1")?,
                x2: req(call, "x2")?,
                y2: req(call, "y2")?,
                color: opt_color(call, "color").unwrap_or_else(|| "black".to_string()),
                width: call.int_arg("width").unwrap_or(1),
            },
            "draw_arc" => Self::Arc {
                center_x: req(call, "center_x")?,
                center_y: req(call, "center_y")?,
                radius: req(call, "radius")?,
                start_angle: req(call, "start_angle")?,
                end_angle: req(call, "end_angle")?,
                color: opt_color(call, "color").unwrap_or_else(|| "black".to_string()),
                width: call.int_arg("width").unwrap_or(1),
            },
            "draw_circle" => Self::Circle {
                center_x: req(call, "center_x")?,
                center_y: req(call, "center_y")?,
                radius: req(call, "radius")?,
                style: Style::from_call(call),
            },
            "draw_triangle" => Self::Triangle {
                points: [
                    (req(call, "x1")?, req(call, "y1")?),
                    (req(call, "x2")?, req(call, "y2")?),
                    (req(call, "x3")?, req(call, "y3")?),
                ],
                style: Style::from_call(call),
            },
            "draw_rectangle" => Self::Rectangle {
                x: req(call, "x")?,
                y: req(call, "y")?,
                width: req(call, "width")?,
                height: req(call, "height")?,
                style: Style::from_call(call),
            },
            "draw_star" => Self::Star {
                center_x: req(call, "center_x")?,
                center_y: req(call, "center_y")?,
                outer_radius: req(call, "outer_radius")?,
                inner_radius: req(call, "inner_radius")?,
                points: req(call, "points")?,
                style: Style::from_call(call),
            },
            other => return Err(ValidationError::UnknownPrimitive(other.to_string()).into()),
        };
        Ok(shape)
    }

    /// Short human-readable result, fed back to the reasoning service.
    pub fn summary(&self) -> String {
        match self {
            Self::Line { x1, y1, x2, y2, color, .. } => {
                format!("{color} line from ({x1}, {y1}) to ({x2}, {y2})")
            }
            Self::Arc { center_x, center_y, radius, start_angle, end_angle, .. } => format!(
                "arc around ({center_x}, {center_y}) radius {radius} from {start_angle} to {end_angle} degrees"
            ),
            Self::Circle { center_x, center_y, radius, style } => {
                format!("{}circle at ({center_x}, {center_y}) radius {radius}", fill_prefix(style))
            }
            Self::Triangle { points, style } => format!(
                "{}triangle ({}, {}) ({}, {}) ({}, {})",
                fill_prefix(style),
                points[0].0,
                points[0].1,
                points[1].0,
                points[1].1,
                points[2].0,
                points[2].1
            ),
            Self::Rectangle { x, y, width, height, style } => {
                format!("{}rectangle {width}x{height} at ({x}, {y})", fill_prefix(style))
            }
            Self::Star { center_x, center_y, points, style, .. } => {
                format!("{}{points}-point star at ({center_x}, {center_y})", fill_prefix(style))
            }
        }
    }
}

/// Vertices of a star, alternating outer and inner radius, first point up.
pub fn star_vertices(
    center_x: i64,
    center_y: i64,
    outer_radius: i64,
    inner_radius: i64,
    points: i64,
) -> Vec<(f64, f64)> {
    let n = points.max(MIN_STAR_POINTS);
    (0..2 * n)
        .map(|i| {
            let angle = std::f64::consts::PI / n as f64 * i as f64 - std::f64::consts::FRAC_PI_2;
            let r = if i % 2 == 0 { outer_radius } else { inner_radius } as f64;
            (center_x as f64 + r * angle.cos(), center_y as f64 + r * angle.sin())
        })
        .collect()
}

fn fill_prefix(style: &Style) -> String {
    style.fill.as_ref().map(|f| format!("{f} ")).unwrap_or_default()
}

fn req(call: &ToolCall, key: &str) -> Result<i64> {
    call.int_arg(key).ok_or_else(|| {
        DrawError::Validation(ValidationError::MissingArgument {
            primitive: call.name.clone(),
            arg: key.to_string(),
        })
    })
}

fn opt_color(call: &ToolCall, key: &str) -> Option<String> {
    call.str_arg(key).map(str::trim).filter(|c| !c.is_empty()).map(str::to_string)
}
