//! Pointer bearings around the knob center.
//!
//! Angles are in degrees, measured clockwise from 12 o'clock, in screen
//! coordinates (y grows downwards).

use crate::geometry::Point;

/// Bearing of `point` as seen from `center`, in `[0, 360)`.
pub fn bearing(center: Point, point: Point) -> f64 {
    let (dx, dy) = (point.x - center.x, point.y - center.y);

    if dx == 0.0 {
        return if dy < 0.0 { 0.0 } else { 180.0 };
    }

    let raw = (dy / dx).atan().to_degrees();
    if dx > 0.0 { raw + 90.0 } else { raw + 270.0 }
}

/// Angular movement of the pointer from `from` to `to`.
///
/// A step across 12 o'clock is cut at the seam: clockwise it yields the
/// distance left up to 360, counter-clockwise the distance back down to 0.
pub fn delta(center: Point, from: Point, to: Point) -> f64 {
    let old = bearing(center, from);
    let delta = bearing(center, to) - old;

    if delta >= 180.0 {
        -old
    } else if delta <= -180.0 {
        360.0 - old
    } else {
        delta
    }
}
