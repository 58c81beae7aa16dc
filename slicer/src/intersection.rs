use std::fmt;

use crate::{Point2, Pos};

/// Edges whose extent along the slicing axis falls below this are
/// degenerate and produce no intersection point. The same epsilon
/// deduplicates the triple-point case below.
const EDGE_EPSILON: f32 = 1e-9;

/// One of the three orthogonal slicing directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Drops the coordinate along this axis, mapping a 3D point into
    /// the slice plane's 2D frame: X slices to (y, z), Y to (x, z) and
    /// Z to (x, y).
    pub fn project(&self, point: Pos) -> Point2 {
        match self {
            Axis::X => Point2::new(point.y, point.z),
            Axis::Y => Point2::new(point.x, point.z),
            Axis::Z => Point2::new(point.x, point.y),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// One triangle's two-point intersection with a slice plane, already
/// projected into the plane's 2D frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f32 {
        (self.b - self.a).norm()
    }
}

/// Intersects a single triangle with the plane at `position` along
/// `axis`.
///
/// Each edge crossing the plane (endpoints on opposite sides of, or
/// exactly at, the position) contributes one interpolated point. Two
/// points make a segment. Three points happen when the plane passes
/// exactly through a vertex and both of its edges report it; the
/// duplicate is dropped and the triangle still yields its segment.
pub fn triangle_plane(vertices: [Pos; 3], axis: Axis, position: f32) -> Option<Segment> {
    let mut points = [Point2::zeros(); 3];
    let mut count = 0;

    for i in 0..3 {
        let (start, end) = (vertices[i], vertices[(i + 1) % 3]);
        let (a, b) = (start[axis.index()], end[axis.index()]);

        if (a - position) * (b - position) > 0.0 {
            continue;
        }

        let denominator = b - a;
        if denominator.abs() < EDGE_EPSILON {
            continue;
        }

        // Clamping guards against floating point overshoot past the
        // edge endpoints.
        let t = ((position - a) / denominator).clamp(0.0, 1.0);
        points[count] = axis.project(start + t * (end - start));
        count += 1;
    }

    let close = |a: Point2, b: Point2| {
        (a.x - b.x).abs() < EDGE_EPSILON && (a.y - b.y).abs() < EDGE_EPSILON
    };

    match count {
        2 => Some(Segment::new(points[0], points[1])),
        3 if close(points[0], points[1]) => Some(Segment::new(points[0], points[2])),
        3 => Some(Segment::new(points[0], points[1])),
        _ => None,
    }
}
