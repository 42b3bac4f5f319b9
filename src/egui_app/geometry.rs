#![cfg(feature = "egui")]

use eframe::egui::{Pos2, Vec2};

/// Point on a circle around `center` at `angle` radians (screen space, y down).
pub fn arc_point(center: Pos2, radius: f32, angle: f64) -> Pos2 {
    center + Vec2::new(angle.cos() as f32, angle.sin() as f32) * radius
}

/// Split an arc into steps of at most `max_step` radians. Returns the
/// boundary angles including both ends; an empty sweep yields no angles.
pub fn arc_steps(start: f64, sweep: f64, max_step: f64) -> Vec<f64> {
    if sweep <= 0.0 || max_step <= 0.0 {
        return Vec::new();
    }
    let n = (sweep / max_step).ceil().max(1.0) as usize;
    (0..=n).map(|i| start + sweep * i as f64 / n as f64).collect()
}

/// Anchor for a slice label: middle of the slice, halfway through the ring.
pub fn slice_label_pos(center: Pos2, inner: f32, outer: f32, start: f64, sweep: f64) -> Pos2 {
    arc_point(center, (inner + outer) * 0.5, start + sweep * 0.5)
}
