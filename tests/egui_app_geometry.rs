#![cfg(feature = "egui")]

use callview::egui_app::{arc_point, arc_steps, slice_label_pos};
use eframe::egui::Pos2;
use std::f64::consts::{FRAC_PI_2, PI};

#[test]
fn arc_steps_cover_sweep() {
    let steps = arc_steps(0.0, PI, 0.5);
    assert_eq!(steps.len(), 8);
    assert_eq!(steps[0], 0.0);
    assert!((steps[steps.len() - 1] - PI).abs() < 1e-12);
    assert!(arc_steps(0.0, 0.0, 0.5).is_empty());
}

#[test]
fn arc_points_run_clockwise_from_top() {
    let c = Pos2::new(100.0, 100.0);
    let top = arc_point(c, 10.0, -FRAC_PI_2);
    assert!((top.x - 100.0).abs() < 1e-4 && (top.y - 90.0).abs() < 1e-4);
    let right = arc_point(c, 10.0, 0.0);
    assert!((right.x - 110.0).abs() < 1e-4);
    let label = slice_label_pos(c, 4.0, 10.0, -FRAC_PI_2, PI);
    assert!((label.x - 107.0).abs() < 1e-4 && (label.y - 100.0).abs() < 1e-4);
}
