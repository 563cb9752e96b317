//! Label Layout
//! Places transition and state labels relative to their arrows and circles,
//! and rewrites the shorthand accepted in transition label input

use serde::{Deserialize, Serialize};

use crate::geometry::{
    perpendicular_unit_vector, solve_two_lines, unit_vector, Line, Point, Segment, Size,
};


/// The empty-transition symbol.
pub const EPSILON: &str = "\u{03B5}";
pub const RIGHT_ARROW: &str = "\u{2192}";

/// Longitudinal ratios are kept within half an edge length either side of the midpoint.
pub const MAX_RATIO: f32 = 0.5;

/// Apply the transition label shorthand: `\e` becomes epsilon, `->` becomes
/// a right arrow and `\n` becomes a newline.
pub fn substitute_transition_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut it = raw.chars().peekable();
    while let Some(ch) = it.next() {
        match (ch, it.peek().copied()) {
            ('\\', Some('e')) => {
                it.next();
                out.push_str(EPSILON);
            }
            ('\\', Some('n')) => {
                it.next();
                out.push('\n');
            }
            ('-', Some('>')) => {
                it.next();
                out.push_str(RIGHT_ARROW);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Text committed for a new transition: substituted input, or epsilon when empty.
pub fn transition_text(raw: &str) -> String {
    let text = substitute_transition_text(raw.trim());
    if text.is_empty() {
        EPSILON.to_string()
    } else {
        text
    }
}

/// A corner of a label's text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position of this corner relative to the box's top-left corner.
    pub fn from_top_left(self, size: Size) -> Point {
        match self {
            Corner::TopLeft => Point::ZERO,
            Corner::TopRight => Point::new(size.width, 0.0),
            Corner::BottomRight => Point::new(size.width, size.height),
            Corner::BottomLeft => Point::new(0.0, size.height),
        }
    }

    /// Position of this corner relative to the box's center.
    pub fn from_center(self, size: Size) -> Point {
        self.from_top_left(size) - size.half()
    }
}

/// Which corner sits nearest the line a label is attached to, plus the
/// user-controlled longitudinal shift.
///
/// The ratio is relative to the edge length, so a dragged label keeps its
/// relative position when the edge endpoints move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelAnchor {
    pub corner: Corner,
    pub ratio: f32,
}

/// Result of a layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub top_left: Point,
    pub corner: Corner,
}

/// Corner of a box of `size` closest to a line lying on the `-normal` side of it.
pub fn closest_corner(size: Size, normal: Point) -> Corner {
    let mut best = Corner::TopLeft;
    let mut best_dot = f32::INFINITY;
    for corner in Corner::ALL {
        let d = corner.from_center(size).dot(normal);
        if d < best_dot - 1e-6 {
            best = corner;
            best_dot = d;
        }
    }
    best
}

/// Lay a box beside the line through `base` running along `along`.
///
/// The box is pushed out along `normal` by half its diagonal, its closest
/// corner is brought onto the normal through that offset point, then moved
/// `clearance` further out and `shift` along the line.
fn place_beside(
    base: Point,
    along: Point,
    normal: Point,
    size: Size,
    shift: f32,
    clearance: f32,
) -> Placement {
    let offset_point = base + normal * (size.diagonal() / 2.0);
    let corner = closest_corner(size, normal);
    let corner_point = offset_point + corner.from_center(size);

    let anchor = Line::through(corner_point, along)
        .zip(Line::through(offset_point, normal))
        .and_then(|(parallel, across)| solve_two_lines(parallel, across))
        .unwrap_or(offset_point);

    let anchor = anchor + normal * clearance + along * shift;
    Placement {
        top_left: anchor - corner.from_top_left(size),
        corner,
    }
}

/// Place a transition label next to a straight arrow.
///
/// `direction` is the source-to-target direction; it is passed separately
/// because the trimmed `segment` may collapse to a point. The label goes on
/// the side of [`perpendicular_unit_vector`], the same side an opposite-pair
/// arrow is offset towards.
pub fn layout_edge_label(
    segment: Segment,
    direction: Point,
    size: Size,
    ratio: f32,
    clearance: f32,
) -> Option<Placement> {
    let along = unit_vector(direction)?;
    let normal = perpendicular_unit_vector(direction)?;
    let shift = ratio * segment.length();
    Some(place_beside(
        segment.midpoint(),
        along,
        normal,
        size,
        shift,
        clearance,
    ))
}

/// Place a self-loop label outside the loop, radially beyond its tip.
pub fn layout_loop_label(
    center: Point,
    tip: Point,
    loop_diameter: f32,
    size: Size,
    ratio: f32,
    clearance: f32,
) -> Option<Placement> {
    let normal = unit_vector(tip - center)?;
    let along = Point::new(-normal.y, normal.x);
    Some(place_beside(
        tip,
        along,
        normal,
        size,
        ratio * loop_diameter,
        clearance,
    ))
}

/// Top-left corner of a label centered on a node.
pub fn layout_node_label(center: Point, size: Size) -> Point {
    center - size.half()
}

/// Signed longitudinal ratio of `pointer` along `segment`, measured from its midpoint.
pub fn drag_ratio(segment: Segment, direction: Point, pointer: Point) -> Option<f32> {
    let along = unit_vector(direction)?;
    ratio_along(segment.midpoint(), along, segment.length(), pointer)
}

/// Signed ratio of `pointer` along the tangent at a self-loop tip.
pub fn loop_drag_ratio(center: Point, tip: Point, loop_diameter: f32, pointer: Point) -> Option<f32> {
    let normal = unit_vector(tip - center)?;
    let along = Point::new(-normal.y, normal.x);
    ratio_along(tip, along, loop_diameter, pointer)
}

fn ratio_along(base: Point, along: Point, length: f32, pointer: Point) -> Option<f32> {
    if length <= f32::EPSILON {
        return None;
    }
    let ratio = (pointer - base).dot(along) / length;
    Some(ratio.clamp(-MAX_RATIO, MAX_RATIO))
}
