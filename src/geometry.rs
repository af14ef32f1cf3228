//! Planar geometry helpers
//!
//! Distances, point-in-rectangle and point-in-triangle tests on [`Point2d`].
//! All functions are pure.

use crate::types::Point2d;

/// Relative slack allowed when comparing the sub-triangle area sum
/// against the full triangle area.
const AREA_REL_TOL: f64 = 1e-9;

pub fn distance(a: Point2d, b: Point2d) -> f64 {
    distance_xy(a.x, a.y, b.x, b.y)
}

pub fn distance_xy(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    (x1 - x0).hypot(y1 - y0)
}

/// Strictly inside the axis-aligned box. Points on an edge are outside.
pub fn is_inside_rectangle(p: Point2d, max_x: f64, min_x: f64, max_y: f64, min_y: f64) -> bool {
    p.x > min_x && p.x < max_x && p.y > min_y && p.y < max_y
}

/// Unsigned area via the shoelace formula
pub fn triangle_area(a: Point2d, b: Point2d, c: Point2d) -> f64 {
    (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs() / 2.0
}

/// Area-sum test: `p` is inside when the three triangles it forms with the
/// edges add up to the full triangle. Edges and vertices count as inside.
pub fn is_inside_triangle(p: Point2d, a: Point2d, b: Point2d, c: Point2d) -> bool {
    let full = triangle_area(a, b, c);
    let parts = triangle_area(p, b, c) + triangle_area(a, p, c) + triangle_area(a, b, p);
    let scale = full.abs().max(parts.abs()).max(f64::MIN_POSITIVE);
    (parts - full).abs() <= AREA_REL_TOL * scale
}
