#![cfg(feature = "egui")]

use eframe::egui::{self, Align2, Color32, Pos2, Stroke, epaint::Shape};

use crate::model::CallCategory;
use crate::summary::SummaryView;

use super::geometry::{arc_point, arc_steps, slice_label_pos};

/// Inner radius of the donut relative to the outer radius.
const HOLE: f32 = 0.35;
const MAX_STEP: f64 = 0.05;

pub(crate) fn category_color(c: CallCategory) -> Color32 {
    match c {
        CallCategory::AA => Color32::from_rgb(31, 119, 180),
        CallCategory::AB => Color32::from_rgb(255, 127, 14),
        CallCategory::BB => Color32::from_rgb(44, 160, 44),
        CallCategory::NoCall => Color32::from_rgb(127, 127, 127),
    }
}

/// Paint the summary as a donut chart centered at `center`.
pub fn paint_pie(painter: &egui::Painter, center: Pos2, radius: f32, view: &SummaryView) {
    let inner = radius * HOLE;
    if view.is_empty() {
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::GRAY));
        painter.text(
            center,
            Align2::CENTER_CENTER,
            "No calls loaded",
            egui::FontId::proportional(14.0),
            Color32::GRAY,
        );
        return;
    }
    for slice in &view.slices {
        let fill = category_color(slice.category);
        let angles = arc_steps(slice.start_angle, slice.sweep, MAX_STEP);
        // Each ring segment is a convex quad; the full donut slice is not.
        for w in angles.windows(2) {
            let quad = vec![
                arc_point(center, radius, w[0]),
                arc_point(center, radius, w[1]),
                arc_point(center, inner, w[1]),
                arc_point(center, inner, w[0]),
            ];
            painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
        }
        if slice.percent >= 3.0 {
            painter.text(
                slice_label_pos(center, inner, radius, slice.start_angle, slice.sweep),
                Align2::CENTER_CENTER,
                slice.label(),
                egui::FontId::proportional(13.0),
                Color32::WHITE,
            );
        }
    }
}
