//! Drawing plans composed from a small catalogue of known subjects.

use drawai_core::{CanvasConfig, NAMED_COLORS, ToolCall};

/// Something the composer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Circle,
    Square,
    Triangle,
    Star,
    Line,
    House,
    Door,
    Window,
    Sun,
    Tree,
}

impl Subject {
    pub const ALL: [Subject; 10] = [
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Star,
        Self::Line,
        Self::House,
        Self::Door,
        Self::Window,
        Self::Sun,
        Self::Tree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Star => "star",
            Self::Line => "line",
            Self::House => "house",
            Self::Door => "door",
            Self::Window => "window",
            Self::Sun => "sun",
            Self::Tree => "tree",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        let singular = word.strip_suffix("es").filter(|w| w.ends_with("hous")).map(|_| "house");
        let singular = singular.or_else(|| word.strip_suffix('s')).unwrap_or(word);
        Self::ALL.into_iter().find(|s| s.as_str() == word || s.as_str() == singular)
    }

    /// Part of a house scene rather than a free-standing shape.
    pub fn is_scenic(&self) -> bool {
        matches!(self, Self::House | Self::Door | Self::Window | Self::Sun | Self::Tree)
    }

    fn default_color(&self) -> &'static str {
        match self {
            Self::House => "beige",
            Self::Door => "brown",
            Self::Window => "lightblue",
            Self::Sun => "gold",
            Self::Tree => "green",
            Self::Circle | Self::Square | Self::Triangle | Self::Star | Self::Line => "black",
        }
    }
}

/// One subject as mentioned in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub subject: Subject,
    pub count: u32,
    pub color: Option<String>,
}

const MAX_COUNT: u32 = 4;

fn number_word(word: &str) -> Option<u32> {
    match word {
        "a" | "an" | "one" | "single" => Some(1),
        "two" | "pair" | "couple" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        _ => word.parse().ok(),
    }
}

/// Subjects in order of first mention, each with the colour and count written
/// just before it.
pub fn mentions(request: &str) -> Vec<Mention> {
    let lower = request.to_lowercase();
    let mut out: Vec<Mention> = Vec::new();
    let mut color: Option<String> = None;
    let mut count: Option<u32> = None;

    for word in lower.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
        if let Some(subject) = Subject::from_word(word) {
            let n = count.take().unwrap_or(1).clamp(1, MAX_COUNT);
            let c = color.take();
            match out.iter_mut().find(|m| m.subject == subject) {
                Some(existing) => {
                    existing.count = (existing.count + n).min(MAX_COUNT);
                    existing.color = existing.color.take().or(c);
                }
                None => out.push(Mention { subject, count: n, color: c }),
            }
        } else if NAMED_COLORS.contains(&word) {
            color = Some(word.to_string());
        } else if let Some(n) = number_word(word) {
            count = Some(n);
        }
    }
    out
}

/// Lays out the mentioned subjects on `canvas` as primitive calls.
///
/// Scenic subjects share one house scene; plain shapes are spaced evenly on a
/// row. A request naming nothing known becomes a single circle.
pub fn compose(request: &str, canvas: &CanvasConfig) -> Vec<ToolCall> {
    let mut found = mentions(request);
    if found.is_empty() {
        found.push(Mention { subject: Subject::Circle, count: 1, color: None });
    }

    let frame = Frame::new(canvas);
    let (scenic, shapes): (Vec<_>, Vec<_>) = found.into_iter().partition(|m| m.subject.is_scenic());

    let mut calls = Vec::new();
    if !scenic.is_empty() {
        scene(&frame, &scenic, &mut calls);
    }

    let total: u32 = shapes.iter().map(|m| m.count).sum();
    let mut slot = 0;
    for mention in &shapes {
        for _ in 0..mention.count {
            let color = mention.color.as_deref().unwrap_or(mention.subject.default_color());
            calls.push(shape(&frame, mention.subject, color, slot, total, !scenic.is_empty()));
            slot += 1;
        }
    }
    calls
}

/// Scales a design drawn on an 800x800 grid to the real canvas.
struct Frame {
    sx: f64,
    sy: f64,
}

impl Frame {
    fn new(canvas: &CanvasConfig) -> Self {
        Self { sx: f64::from(canvas.width) / 800.0, sy: f64::from(canvas.height) / 800.0 }
    }

    fn x(&self, v: i64) -> i64 {
        (v as f64 * self.sx).round() as i64
    }

    fn y(&self, v: i64) -> i64 {
        (v as f64 * self.sy).round() as i64
    }

    fn size(&self, v: i64) -> i64 {
        ((v as f64 * self.sx.min(self.sy)).round() as i64).max(1)
    }
}

fn rect(f: &Frame, x: i64, y: i64, w: i64, h: i64, fill: &str) -> ToolCall {
    ToolCall::new("draw_rectangle")
        .with_arg("x", f.x(x))
        .with_arg("y", f.y(y))
        .with_arg("width", f.size(w))
        .with_arg("height", f.size(h))
        .with_arg("fill_color", fill)
        .with_arg("stroke_color", "black")
        .with_arg("stroke_width", 2)
}

fn circle(f: &Frame, cx: i64, cy: i64, r: i64, fill: &str) -> ToolCall {
    ToolCall::new("draw_circle")
        .with_arg("center_x", f.x(cx))
        .with_arg("center_y", f.y(cy))
        .with_arg("radius", f.size(r))
        .with_arg("fill_color", fill)
}

fn triangle(f: &Frame, pts: [(i64, i64); 3], fill: &str) -> ToolCall {
    ToolCall::new("draw_triangle")
        .with_arg("x1", f.x(pts[0].0))
        .with_arg("y1", f.y(pts[0].1))
        .with_arg("x2", f.x(pts[1].0))
        .with_arg("y2", f.y(pts[1].1))
        .with_arg("x3", f.x(pts[2].0))
        .with_arg("y3", f.y(pts[2].1))
        .with_arg("fill_color", fill)
        .with_arg("stroke_color", "black")
        .with_arg("stroke_width", 2)
}

fn mention_of<'a>(mentions: &'a [Mention], subject: Subject) -> Option<&'a Mention> {
    mentions.iter().find(|m| m.subject == subject)
}

fn scene(f: &Frame, mentions: &[Mention], calls: &mut Vec<ToolCall>) {
    let pick = |subject: Subject| {
        mention_of(mentions, subject)
            .and_then(|m| m.color.clone())
            .unwrap_or_else(|| subject.default_color().to_string())
    };
    let has = |subject: Subject| mention_of(mentions, subject).is_some();

    if has(Subject::Sun) {
        calls.push(circle(f, 660, 140, 70, &pick(Subject::Sun)));
    }
    if has(Subject::Tree) {
        let count = mention_of(mentions, Subject::Tree).map_or(1, |m| m.count) as i64;
        for i in 0..count {
            let x = 120 + i * 90;
            calls.push(rect(f, x - 15, 520, 30, 130, "brown"));
            calls.push(circle(f, x, 480, 60, &pick(Subject::Tree)));
        }
    }

    let needs_house = has(Subject::House) || has(Subject::Door) || has(Subject::Window);
    if !needs_house {
        return;
    }

    calls.push(rect(f, 300, 400, 300, 250, &pick(Subject::House)));
    calls.push(triangle(f, [(280, 400), (450, 260), (620, 400)], "firebrick"));

    if has(Subject::Door) {
        calls.push(rect(f, 420, 530, 60, 120, &pick(Subject::Door)));
    }
    if let Some(window) = mention_of(mentions, Subject::Window) {
        let color = pick(Subject::Window);
        let slots = [(330, 440), (530, 440), (330, 540), (530, 540)];
        for (x, y) in slots.iter().take(window.count as usize) {
            calls.push(rect(f, *x, *y, 50, 50, &color));
        }
    }
}

fn shape(f: &Frame, subject: Subject, color: &str, slot: u32, total: u32, below_scene: bool) -> ToolCall {
    let total = i64::from(total.max(1));
    let slot = i64::from(slot);
    let cell = 800 / total;
    let cx = cell * slot + cell / 2;
    let cy = if below_scene { 730 } else { 400 };
    let half = (cell * 3 / 10).min(if below_scene { 50 } else { 200 }).max(5);

    match subject {
        Subject::Square => ToolCall::new("draw_rectangle")
            .with_arg("x", f.x(cx - half))
            .with_arg("y", f.y(cy - half))
            .with_arg("width", f.size(half * 2))
            .with_arg("height", f.size(half * 2))
            .with_arg("fill_color", color),
        Subject::Triangle => ToolCall::new("draw_triangle")
            .with_arg("x1", f.x(cx - half))
            .with_arg("y1", f.y(cy + half))
            .with_arg("x2", f.x(cx))
            .with_arg("y2", f.y(cy - half))
            .with_arg("x3", f.x(cx + half))
            .with_arg("y3", f.y(cy + half))
            .with_arg("fill_color", color),
        Subject::Star => ToolCall::new("draw_star")
            .with_arg("center_x", f.x(cx))
            .with_arg("center_y", f.y(cy))
            .with_arg("outer_radius", f.size(half))
            .with_arg("inner_radius", f.size(half * 2 / 5).min(f.size(half) - 1).max(1))
            .with_arg("points", 5)
            .with_arg("fill_color", color),
        Subject::Line => ToolCall::new("draw_line")
            .with_arg("x1", f.x(cx - half))
            .with_arg("y1", f.y(cy))
            .with_arg("x2", f.x(cx + half))
            .with_arg("y2", f.y(cy))
            .with_arg("color", color)
            .with_arg("width", 3),
        _ => ToolCall::new("draw_circle")
            .with_arg("center_x", f.x(cx))
            .with_arg("center_y", f.y(cy))
            .with_arg("radius", f.size(half))
            .with_arg("fill_color", color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_pick_up_colour_and_count() {
        let found = mentions("a red circle and two blue stars");
        assert_eq!(
            found,
            vec![
                Mention { subject: Subject::Circle, count: 1, color: Some("red".into()) },
                Mention { subject: Subject::Star, count: 2, color: Some("blue".into()) },
            ]
        );
    }

    #[test]
    fn test_plural_house() {
        assert_eq!(mentions("three houses")[0].subject, Subject::House);
        assert_eq!(mentions("three houses")[0].count, 3);
    }

    #[test]
    fn test_house_scene_has_door_and_windows() {
        let calls = compose("a house with a door and two windows", &CanvasConfig::default());
        // body, roof, door, two windows
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].name, "draw_rectangle");
        assert_eq!(calls[1].name, "draw_triangle");
    }

    #[test]
    fn test_unknown_subject_falls_back_to_circle() {
        let calls = compose("a friendly dragon", &CanvasConfig::default());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "draw_circle");
    }

    #[test]
    fn test_layout_scales_with_canvas() {
        let small = CanvasConfig::default().with_size(400, 400);
        let call = &compose("a red circle", &small)[0];
        assert_eq!(call.int_arg("center_x"), Some(200));
        assert_eq!(call.int_arg("center_y"), Some(200));
    }
}
