//! Geometry Utilities
//! Pure vector math used to place arrows, loops, markers and labels

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};


/// Gap kept between a circle outline and the end of an arrow drawn to it.
pub const ARROW_MARGIN: f32 = 10.0;

/// Ratio `|dx| / |d|` under which [`Line::through`] snaps to a vertical line.
pub const NEAR_VERTICAL: f32 = 1e-3;

/// A point (or free vector) in model space. `y` grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        vector_magnitude(self)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Width and height of an axis-aligned box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn diagonal(self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    pub fn half(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A directed line segment, used for every straight arrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn vector(self) -> Point {
        self.end - self.start
    }

    pub fn length(self) -> f32 {
        distance(self.start, self.end)
    }

    pub fn midpoint(self) -> Point {
        midpoint(self.start, self.end)
    }

    pub fn translate(self, delta: Point) -> Segment {
        Segment::new(self.start + delta, self.end + delta)
    }
}

/// A line in slope-intercept form.
///
/// Vertical lines carry an infinite slope and store their x coordinate in
/// `intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub slope: f32,
    pub intercept: f32,
}

impl Line {
    pub fn vertical(x: f32) -> Self {
        Self {
            slope: f32::INFINITY,
            intercept: x,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    /// Line through `point` running along `direction`.
    ///
    /// Directions within [`NEAR_VERTICAL`] of the y axis are treated as
    /// vertical so the intercept stays representable. Returns `None` for a
    /// zero direction.
    pub fn through(point: Point, direction: Point) -> Option<Self> {
        if direction.is_zero() {
            return None;
        }
        if direction.x.abs() <= NEAR_VERTICAL * direction.length() {
            return Some(Self::vertical(point.x));
        }
        let slope = direction.y / direction.x;
        Some(Self {
            slope,
            intercept: point.y - slope * point.x,
        })
    }
}

pub fn distance(p1: Point, p2: Point) -> f32 {
    vector_magnitude(p2 - p1)
}

pub fn midpoint(p1: Point, p2: Point) -> Point {
    Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0)
}

pub fn vector_magnitude(v: Point) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Unit vector along `v`, or `None` for the zero vector.
pub fn unit_vector(v: Point) -> Option<Point> {
    let mag = vector_magnitude(v);
    if mag <= f32::EPSILON {
        return None;
    }
    Some(Point::new(v.x / mag, v.y / mag))
}

/// Unit vector perpendicular to `v`: `(v.y, -v.x) / |v|`.
///
/// For an edge pointing along `+x` this is `(0, -1)`, i.e. "up" on screen.
pub fn perpendicular_unit_vector(v: Point) -> Option<Point> {
    unit_vector(Point::new(v.y, -v.x))
}

/// Rotate `v` by `degrees` (clockwise on a y-down screen).
pub fn rotate(v: Point, degrees: f32) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Angle of the directed segment `from -> to` in degrees, within `[0, 360)`.
///
/// A segment pointing along `+x` reads as 180 degrees:
/// `theta = atan(dy / dx)`, `+180` when `dx >= 0`, `+360` when still negative.
/// Returns `None` when both points coincide.
pub fn angle_degrees(from: Point, to: Point) -> Option<f32> {
    let d = to - from;
    if d.is_zero() {
        return None;
    }
    let dx = if d.x == 0.0 { 0.0 } else { d.x };
    let mut theta = (d.y / dx).atan().to_degrees();
    if dx >= 0.0 {
        theta += 180.0;
    }
    if theta < 0.0 {
        theta += 360.0;
    }
    if theta >= 360.0 {
        theta -= 360.0;
    }
    Some(theta)
}

/// Snap `theta` to the nearest multiple of `sector` degrees, wrapping to `[0, 360)`.
pub fn quantize_angle(theta: f32, sector: f32) -> f32 {
    if sector <= 0.0 {
        return theta;
    }
    let shifted = theta + sector / 2.0;
    let snapped = shifted - shifted.rem_euclid(sector);
    snapped.rem_euclid(360.0)
}

/// Segment between two circle outlines, pulled in by [`ARROW_MARGIN`] at both ends.
pub fn trimmed_segment(p1: Point, r1: f32, p2: Point, r2: f32) -> Option<Segment> {
    trimmed_segment_with_margin(p1, r1, p2, r2, ARROW_MARGIN)
}

/// Same as [`trimmed_segment`] with an explicit margin.
///
/// The direction comes from `atan(dy / dx)` with both components flipped
/// when `dx < 0`; a vertical pair (`dx == 0`) resolves through
/// `atan(+-inf)`. Coincident centers yield `None`.
pub fn trimmed_segment_with_margin(
    p1: Point,
    r1: f32,
    p2: Point,
    r2: f32,
    margin: f32,
) -> Option<Segment> {
    let d = p2 - p1;
    if d.is_zero() {
        return None;
    }
    let dx = if d.x == 0.0 { 0.0 } else { d.x };
    let theta = (d.y / dx).atan();
    let (mut sin, mut cos) = theta.sin_cos();
    if dx < 0.0 {
        sin = -sin;
        cos = -cos;
    }
    let dir = Point::new(cos, sin);
    let start_radius = r1 + margin;
    let end_radius = vector_magnitude(d) - r2 - margin;
    Some(Segment::new(p1 + dir * start_radius, p1 + dir * end_radius))
}

/// Intersection of two lines.
///
/// Vertical lines are handled through their stored x coordinate. Parallel
/// lines (including two vertical ones) have no intersection and yield `None`;
/// callers fall back to a default placement.
pub fn solve_two_lines(line1: Line, line2: Line) -> Option<Point> {
    match (line1.is_vertical(), line2.is_vertical()) {
        (true, true) => None,
        (true, false) => {
            let x = line1.intercept;
            Some(Point::new(x, line2.slope * x + line2.intercept))
        }
        (false, true) => {
            let x = line2.intercept;
            Some(Point::new(x, line1.slope * x + line1.intercept))
        }
        (false, false) => {
            let dm = line1.slope - line2.slope;
            if dm.abs() <= f32::EPSILON {
                return None;
            }
            let x = (line2.intercept - line1.intercept) / dm;
            let p = Point::new(x, line1.slope * x + line1.intercept);
            p.is_finite().then_some(p)
        }
    }
}

pub fn distance_to_segment(p: Point, segment: Segment) -> f32 {
    let ab = segment.vector();
    let len2 = ab.dot(ab);
    if len2 <= f32::EPSILON {
        return distance(p, segment.start);
    }
    let t = ((p - segment.start).dot(ab) / len2).clamp(0.0, 1.0);
    distance(p, segment.start + ab * t)
}
