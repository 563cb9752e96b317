//! View Adapter contract
//! The editor describes each frame as a back-to-front display list; an
//! adapter paints it and feeds pointer events back with the picked target

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, distance_to_segment, Point, Segment, Size};
use crate::graph::{EdgeId, LabelId, NodeId};


/// Entity under the pointer, as reported by the adapter's hit-testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickTarget {
    /// Empty canvas
    Canvas,
    Node(NodeId),
    /// A straight transition or a self-loop
    Edge(EdgeId),
    Label(LabelId),
}

/// Styling hint for a visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Normal,
    /// Current selection
    Selected,
    /// Hovered in a mode that acts on it
    Highlighted,
    /// Provisional, not part of the graph yet
    Preview,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Circle {
        center: Point,
        radius: f32,
        stroke_width: f32,
    },
    /// Straight line with an arrowhead at `segment.end`
    Arrow {
        segment: Segment,
        stroke_width: f32,
        head_size: f32,
    },
    /// Circular arc, angles in degrees clockwise from `+x`
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
        stroke_width: f32,
    },
    Text {
        top_left: Point,
        size: Size,
        text: String,
    },
}

impl Primitive {
    fn hit(&self, point: Point, tolerance: f32) -> bool {
        match self {
            Primitive::Circle { center, radius, .. } => distance(point, *center) <= radius + tolerance,
            Primitive::Arrow {
                segment,
                stroke_width,
                ..
            } => distance_to_segment(point, *segment) <= stroke_width / 2.0 + tolerance,
            // Loops are hit anywhere inside their circle, not just on the stroke
            Primitive::Arc { center, radius, .. } => distance(point, *center) <= radius + tolerance,
            Primitive::Text { top_left, size, .. } => {
                point.x >= top_left.x - tolerance
                    && point.y >= top_left.y - tolerance
                    && point.x <= top_left.x + size.width + tolerance
                    && point.y <= top_left.y + size.height + tolerance
            }
        }
    }
}

/// A group of primitives drawn and hit-tested together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// `None` for provisional visuals that never receive pointer events
    pub target: Option<PickTarget>,
    pub tone: Tone,
    pub primitives: Vec<Primitive>,
}

/// Everything to draw, back to front.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub visuals: Vec<Visual>,
}

impl DisplayList {
    pub fn push(&mut self, target: Option<PickTarget>, tone: Tone, primitives: Vec<Primitive>) {
        self.visuals.push(Visual {
            target,
            tone,
            primitives,
        });
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// Topmost pickable visual under `point`, or [`PickTarget::Canvas`].
    pub fn pick(&self, point: Point, tolerance: f32) -> PickTarget {
        self.visuals
            .iter()
            .rev()
            .filter_map(|v| v.target.map(|t| (t, v)))
            .find(|(_, v)| v.primitives.iter().any(|p| p.hit(point, tolerance)))
            .map(|(t, _)| t)
            .unwrap_or(PickTarget::Canvas)
    }

    /// Visuals mapped back to `target`.
    pub fn visuals_for(&self, target: PickTarget) -> impl Iterator<Item = &Visual> {
        self.visuals.iter().filter(move |v| v.target == Some(target))
    }
}

/// Rendering surface the editor draws into.
pub trait ViewAdapter {
    /// Replace the whole scene with `scene` in one batch.
    fn redraw(&mut self, scene: &DisplayList);

    /// Rendered size of `text`.
    fn measure_text(&self, text: &str, font_size: f32) -> Size {
        estimate_text_size(text, font_size)
    }
}

/// Size estimate for text without a font engine: 0.6 em per character of the
/// longest line, 1.2 em per line.
pub fn estimate_text_size(text: &str, font_size: f32) -> Size {
    let lines: Vec<&str> = text.split('\n').collect();
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        (widest.max(1) as f32) * font_size * 0.6,
        (lines.len() as f32) * font_size * 1.2,
    )
}
