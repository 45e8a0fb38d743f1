//! Easing curves shared by the transition styles.

use std::f32::consts::PI;

/// Cubic ease-in-out over `t` in `[0, 1]`.
#[must_use]
pub fn cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Glitch intensity envelope: slow rise and fall with a long hold near the
/// peak. Zero at both endpoints, exactly 1 at `t = 0.5`.
#[must_use]
pub fn glitch_envelope(t: f32) -> f32 {
    (t.clamp(0.0, 1.0) * PI).sin().max(0.0).powf(0.6)
}
