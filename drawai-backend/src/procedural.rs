//! Turtle command script output.
//!
//! The script uses a top-left origin with y growing downwards, one command per
//! line. A turtle runtime replays it step by step.

use crate::primitives::{Shape, Style, star_vertices};
use crate::renderer::Renderer;
use drawai_core::{BackendKind, CanvasConfig, Result};
use std::fmt::Write;

pub const SCRIPT_HEADER: &str = "# drawai turtle script v1";

pub struct ProceduralRenderer;

impl Renderer for ProceduralRenderer {
    const KIND: BackendKind = BackendKind::Procedural;

    fn render(canvas: &CanvasConfig, shapes: &[Shape]) -> Result<Vec<u8>> {
        let mut script = Script::default();
        script.line(SCRIPT_HEADER);
        script.line(format!("screen {} {} {}", canvas.width, canvas.height, canvas.background));
        script.line("penup");
        for shape in shapes {
            script.shape(shape);
        }
        script.line("done");
        Ok(script.0.into_bytes())
    }
}

#[derive(Default)]
struct Script(String);

impl Script {
    fn line(&mut self, command: impl AsRef<str>) {
        let _ = writeln!(self.0, "{}", command.as_ref());
    }

    fn pen(&mut self, color: &str, width: i64) {
        self.line(format!("pencolor {color}"));
        self.line(format!("pensize {width}"));
    }

    fn polygon(&mut self, points: &[(String, String)], style: &Style) {
        let Some((first_x, first_y)) = points.first() else { return };
        if style.fill.is_none() && style.visible_stroke().is_none() {
            return;
        }
        match style.visible_stroke() {
            Some(stroke) => self.pen(stroke, style.stroke_width),
            None => self.line("pencolor none"),
        }
        self.line(format!("goto {first_x} {first_y}"));
        if let Some(fill) = &style.fill {
            self.line(format!("fillcolor {fill}"));
            self.line("begin_fill");
        }
        self.line("pendown");
        for (x, y) in points.iter().skip(1).chain(std::iter::once(&points[0])) {
            self.line(format!("goto {x} {y}"));
        }
        self.line("penup");
        if style.fill.is_some() {
            self.line("end_fill");
        }
    }

    fn shape(&mut self, shape: &Shape) {
        match shape {
            Shape::Line { x1, y1, x2, y2, color, width } => {
                self.pen(color, *width);
                self.line(format!("goto {x1} {y1}"));
                self.line("pendown");
                self.line(format!("goto {x2} {y2}"));
                self.line("penup");
            }
            Shape::Arc { center_x, center_y, radius, start_angle, end_angle, color, width } => {
                self.pen(color, *width);
                self.line(format!("goto {center_x} {center_y}"));
                self.line(format!("setheading {start_angle}"));
                self.line(format!("forward {radius}"));
                self.line(format!("setheading {}", start_angle + 90));
                self.line("pendown");
                self.line(format!("circle {radius} {}", end_angle - start_angle));
                self.line("penup");
            }
            Shape::Circle { center_x, center_y, radius, style } => {
                if style.fill.is_none() && style.visible_stroke().is_none() {
                    return;
                }
                match style.visible_stroke() {
                    Some(stroke) => self.pen(stroke, style.stroke_width),
                    None => self.line("pencolor none"),
                }
                self.line(format!("goto {center_x} {}", center_y - radius));
                if let Some(fill) = &style.fill {
                    self.line(format!("fillcolor {fill}"));
                    self.line("begin_fill");
                }
                self.line("pendown");
                self.line(format!("circle {radius}"));
                self.line("penup");
                if style.fill.is_some() {
                    self.line("end_fill");
                }
            }
            Shape::Triangle { points, style } => {
                let points: Vec<_> =
                    points.iter().map(|(x, y)| (x.to_string(), y.to_string())).collect();
                self.polygon(&points, style);
            }
            Shape::Rectangle { x, y, width, height, style } => {
                let corners = [(*x, *y), (x + width, *y), (x + width, y + height), (*x, y + height)];
                let points: Vec<_> =
                    corners.iter().map(|(x, y)| (x.to_string(), y.to_string())).collect();
                self.polygon(&points, style);
            }
            Shape::Star { center_x, center_y, outer_radius, inner_radius, points, style } => {
                let points: Vec<_> =
                    star_vertices(*center_x, *center_y, *outer_radius, *inner_radius, *points)
                        .into_iter()
                        .map(|(x, y)| (format!("{x:.2}"), format!("{y:.2}")))
                        .collect();
                self.polygon(&points, style);
            }
        }
    }
}
