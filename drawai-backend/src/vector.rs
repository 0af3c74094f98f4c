//! SVG output.

use crate::primitives::{Shape, Style, star_vertices};
use crate::renderer::Renderer;
use drawai_core::{BackendKind, CanvasConfig, Result};
use std::fmt::Write;

pub struct VectorRenderer;

impl Renderer for VectorRenderer {
    const KIND: BackendKind = BackendKind::Vector;

    fn render(canvas: &CanvasConfig, shapes: &[Shape]) -> Result<Vec<u8>> {
        let mut doc = format!(
            "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            canvas.width, canvas.height
        );
        let _ = write!(
            doc,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" style=\"fill:{};stroke:none\" />",
            canvas.width,
            canvas.height,
            escape(&canvas.background)
        );
        for shape in shapes {
            doc.push_str(&element(shape));
        }
        doc.push_str("\n</svg>\n");
        Ok(doc.into_bytes())
    }
}

fn style_attr(style: &Style) -> String {
    let mut parts = Vec::with_capacity(3);
    match &style.fill {
        Some(fill) => parts.push(format!("fill:{}", escape(fill))),
        None => parts.push("fill:none".to_string()),
    }
    match style.visible_stroke() {
        Some(stroke) => {
            parts.push(format!("stroke:{}", escape(stroke)));
            parts.push(format!("stroke-width:{}", style.stroke_width));
        }
        None => parts.push("stroke:none".to_string()),
    }
    parts.join(";")
}

fn element(shape: &Shape) -> String {
    match shape {
        Shape::Line { x1, y1, x2, y2, color, width } => format!(
            "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" style=\"stroke:{};stroke-width:{width}\" />",
            escape(color)
        ),
        Shape::Arc { center_x, center_y, radius, start_angle, end_angle, color, width } => {
            let start = start_angle.rem_euclid(360);
            let mut end = end_angle.rem_euclid(360);
            if end <= start {
                end += 360;
            }
            let point = |deg: i64| {
                let rad = (deg as f64).to_radians();
                (*center_x as f64 + *radius as f64 * rad.cos(), *center_y as f64 + *radius as f64 * rad.sin())
            };
            let (sx, sy) = point(start);
            let (ex, ey) = point(end);
            let large_arc = i32::from(end - start > 180);
            format!(
                "<path d=\"M {sx:.2},{sy:.2} A {radius},{radius} 0 {large_arc},1 {ex:.2},{ey:.2}\" style=\"fill:none;stroke:{};stroke-width:{width}\" />",
                escape(color)
            )
        }
        Shape::Circle { center_x, center_y, radius, style } => format!(
            "<circle cx=\"{center_x}\" cy=\"{center_y}\" r=\"{radius}\" style=\"{}\" />",
            style_attr(style)
        ),
        Shape::Triangle { points, style } => {
            let points = points.iter().map(|(x, y)| format!("{x},{y}")).collect::<Vec<_>>().join(" ");
            format!("<polygon points=\"{points}\" style=\"{}\" />", style_attr(style))
        }
        Shape::Rectangle { x, y, width, height, style } => format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" style=\"{}\" />",
            style_attr(style)
        ),
        Shape::Star { center_x, center_y, outer_radius, inner_radius, points, style } => {
            let points = star_vertices(*center_x, *center_y, *outer_radius, *inner_radius, *points)
                .into_iter()
                .map(|(x, y)| format!("{x:.2},{y:.2}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("<polygon points=\"{points}\" style=\"{}\" />", style_attr(style))
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shapes: &[Shape]) -> String {
        String::from_utf8(VectorRenderer::render(&CanvasConfig::default(), shapes).unwrap()).unwrap()
    }

    #[test]
    fn test_document_shell() {
        let svg = render(&[]);
        assert!(svg.starts_with("<svg width=\"800\" height=\"800\" xmlns=\"http://www.w3.org/2000/svg\">"));
        assert!(svg.contains("style=\"fill:white;stroke:none\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_circle_style() {
        let svg = render(&[Shape::Circle {
            center_x: 10,
            center_y: 20,
            radius: 5,
            style: Style { fill: Some("red".into()), stroke: Some("#000".into()), stroke_width: 2 },
        }]);
        assert!(svg.contains(
            "<circle cx=\"10\" cy=\"20\" r=\"5\" style=\"fill:red;stroke:#000;stroke-width:2\" />"
        ));
    }

    #[test]
    fn test_half_circle_arc_flags() {
        let svg = render(&[Shape::Arc {
            center_x: 100,
            center_y: 100,
            radius: 10,
            start_angle: 0,
            end_angle: 270,
            color: "black".into(),
            width: 1,
        }]);
        assert!(svg.contains("A 10,10 0 1,1"));
    }
}
