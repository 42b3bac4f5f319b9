//! Chart-ready view of the cohort call summary.

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::model::{AggregateCounts, CallCategory};

/// One pie slice. Angles are in radians, starting at 12 o'clock and running
/// clockwise in screen coordinates (y down).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub category: CallCategory,
    pub value: f64,
    pub percent: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl Slice {
    /// Label drawn on the slice, e.g. `AB 12.5%`.
    pub fn label(&self) -> String {
        format!("{} {:.1}%", self.category, self.percent)
    }
}

/// Pie series plus table rows for the summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub slices: Vec<Slice>,
    pub total: f64,
}

impl SummaryView {
    pub fn from_counts(counts: &AggregateCounts) -> Self {
        let total = counts.total();
        // An empty summary still renders; percentages are computed against 1.
        let denom = if total > 0.0 { total } else { 1.0 };
        let mut angle = -FRAC_PI_2;
        let slices = counts
            .iter()
            .map(|(category, value)| {
                let fraction = value / denom;
                let slice = Slice {
                    category,
                    value,
                    percent: fraction * 100.0,
                    start_angle: angle,
                    sweep: fraction * TAU,
                };
                angle += slice.sweep;
                slice
            })
            .collect();
        Self { slices, total }
    }

    /// True when every category is zero.
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }

    /// `(label, formatted value)` rows, followed by a `Total` row.
    pub fn table_rows(&self) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = self
            .slices
            .iter()
            .map(|s| (s.category.to_string(), format_count(s.value)))
            .collect();
        rows.push(("Total".to_string(), format_count(self.total)));
        rows
    }
}

/// Format a count with thousands separators and at most three decimals.
pub fn format_count(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    if negative && rounded > 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    let frac = ((rounded - rounded.trunc()) * 1000.0).round() as u64;
    if frac > 0 {
        let f = format!("{:03}", frac);
        out.push('.');
        out.push_str(f.trim_end_matches('0'));
    }
    out
}
