//! Raster output: a pixel-space display list a rasterizer can replay.

use crate::primitives::{Shape, Style, star_vertices};
use crate::renderer::Renderer;
use drawai_core::{BackendKind, CanvasConfig, Result};
use serde::Serialize;

pub const DISPLAY_LIST_FORMAT: &str = "drawai-raster/1";

#[derive(Debug, Serialize)]
struct DisplayList<'a> {
    format: &'static str,
    width: u32,
    height: u32,
    background: &'a str,
    operations: Vec<RasterOp>,
}

/// Pixel-level drawing operation with bounding boxes resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RasterOp {
    Line { from: (i64, i64), to: (i64, i64), color: String, width: i64 },
    Arc { bbox: [i64; 4], start: i64, end: i64, color: String, width: i64 },
    Ellipse { bbox: [i64; 4], #[serde(skip_serializing_if = "Option::is_none")] fill: Option<String>, #[serde(skip_serializing_if = "Option::is_none")] outline: Option<String>, width: i64 },
    Rectangle { bbox: [i64; 4], #[serde(skip_serializing_if = "Option::is_none")] fill: Option<String>, #[serde(skip_serializing_if = "Option::is_none")] outline: Option<String>, width: i64 },
    Polygon { points: Vec<(i64, i64)>, #[serde(skip_serializing_if = "Option::is_none")] fill: Option<String>, #[serde(skip_serializing_if = "Option::is_none")] outline: Option<String>, width: i64 },
}

pub struct RasterRenderer;

impl RasterRenderer {
    pub fn operations(shapes: &[Shape]) -> Vec<RasterOp> {
        shapes.iter().map(to_op).collect()
    }
}

impl Renderer for RasterRenderer {
    const KIND: BackendKind = BackendKind::Raster;

    fn render(canvas: &CanvasConfig, shapes: &[Shape]) -> Result<Vec<u8>> {
        let list = DisplayList {
            format: DISPLAY_LIST_FORMAT,
            width: canvas.width,
            height: canvas.height,
            background: &canvas.background,
            operations: Self::operations(shapes),
        };
        Ok(serde_json::to_vec_pretty(&list)?)
    }
}

fn outline(style: &Style) -> (Option<String>, i64) {
    match style.visible_stroke() {
        Some(color) => (Some(color.to_string()), style.stroke_width),
        None => (None, 0),
    }
}

fn to_op(shape: &Shape) -> RasterOp {
    match shape {
        Shape::Line { x1, y1, x2, y2, color, width } => {
            RasterOp::Line { from: (*x1, *y1), to: (*x2, *y2), color: color.clone(), width: *width }
        }
        Shape::Arc { center_x, center_y, radius, start_angle, end_angle, color, width } => RasterOp::Arc {
            bbox: [center_x - radius, center_y - radius, center_x + radius, center_y + radius],
            start: *start_angle,
            end: *end_angle,
            color: color.clone(),
            width: *width,
        },
        Shape::Circle { center_x, center_y, radius, style } => {
            let (outline, width) = outline(style);
            RasterOp::Ellipse {
                bbox: [center_x - radius, center_y - radius, center_x + radius, center_y + radius],
                fill: style.fill.clone(),
                outline,
                width,
            }
        }
        Shape::Triangle { points, style } => {
            let (outline, width) = outline(style);
            RasterOp::Polygon { points: points.to_vec(), fill: style.fill.clone(), outline, width }
        }
        Shape::Rectangle { x, y, width: w, height: h, style } => {
            let (outline, width) = outline(style);
            RasterOp::Rectangle { bbox: [*x, *y, x + w, y + h], fill: style.fill.clone(), outline, width }
        }
        Shape::Star { center_x, center_y, outer_radius, inner_radius, points, style } => {
            let (outline, width) = outline(style);
            let points = star_vertices(*center_x, *center_y, *outer_radius, *inner_radius, *points)
                .into_iter()
                .map(|(x, y)| (x.round() as i64, y.round() as i64))
                .collect();
            RasterOp::Polygon { points, fill: style.fill.clone(), outline, width }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_circle_becomes_ellipse_bbox() {
        let shapes = [Shape::Circle {
            center_x: 400,
            center_y: 400,
            radius: 50,
            style: Style { fill: Some("red".into()), stroke: None, stroke_width: 1 },
        }];
        let bytes = RasterRenderer::render(&CanvasConfig::default(), &shapes).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(doc["format"], json!(DISPLAY_LIST_FORMAT));
        assert_eq!(doc["background"], json!("white"));
        assert_eq!(
            doc["operations"][0],
            json!({"op": "ellipse", "bbox": [350, 350, 450, 450], "fill": "red", "width": 0})
        );
    }

    #[test]
    fn test_zero_width_stroke_is_dropped() {
        let style = Style { fill: None, stroke: Some("blue".into()), stroke_width: 0 };
        let ops = RasterRenderer::operations(&[Shape::Rectangle { x: 1, y: 2, width: 3, height: 4, style }]);
        assert_eq!(
            ops[0],
            RasterOp::Rectangle { bbox: [1, 2, 4, 6], fill: None, outline: None, width: 0 }
        );
    }
}
