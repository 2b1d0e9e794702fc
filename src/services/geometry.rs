//! Geometry utilities shared by all exercise analyzers
//!
//! All functions are pure and work in normalized image coordinates
//! (x grows right, y grows down). Degenerate input never yields NaN.

use crate::models::landmark::Landmark;

/// Angle in degrees at vertex `b` between rays `b -> a` and `b -> c`
///
/// Computed as the difference of two `atan2` calls and reflected into
/// [0, 180]. Returns 0 when either ray has zero length or any coordinate
/// is not finite.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let coords = [a.x, a.y, b.x, b.y, c.x, c.y];
    if coords.iter().any(|v| !v.is_finite()) {
        return 0.0;
    }
    if (a.x == b.x && a.y == b.y) || (c.x == b.x && c.y == b.y) {
        return 0.0;
    }

    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut angle = radians.to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// Midpoint of two landmarks; visibility is the weaker of the two
pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
    Landmark {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: (a.z + b.z) / 2.0,
        visibility: a.visibility.min(b.visibility),
    }
}

/// Direction of the segment `from -> to` in degrees, in (-180, 180]
pub fn segment_angle(from: &Landmark, to: &Landmark) -> f64 {
    let dy = to.y - from.y;
    let dx = to.x - from.x;
    if !dx.is_finite() || !dy.is_finite() {
        return 0.0;
    }
    dy.atan2(dx).to_degrees()
}

/// Deviation of the segment `from -> to` from horizontal, in [0, 90]
pub fn deviation_from_horizontal(from: &Landmark, to: &Landmark) -> f64 {
    let angle = segment_angle(from, to).abs();
    angle.min(180.0 - angle)
}

/// Linear map of `value` from [in_min, in_max] onto [0, 100], clamped
pub fn percent_of_range(value: f64, in_min: f64, in_max: f64) -> f64 {
    if !value.is_finite() || in_max == in_min {
        return 0.0;
    }
    ((value - in_min) / (in_max - in_min) * 100.0).clamp(0.0, 100.0)
}
