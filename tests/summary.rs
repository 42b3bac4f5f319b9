use std::f64::consts::{FRAC_PI_2, TAU};

use callview::model::{AggregateCounts, CallCategory};
use callview::summary::{SummaryView, format_count};

#[test]
fn slices_follow_category_order_and_cover_the_circle() {
    let counts = AggregateCounts {
        aa: 50.0,
        ab: 25.0,
        bb: 25.0,
        no_call: 0.0,
    };
    let view = SummaryView::from_counts(&counts);
    let cats: Vec<CallCategory> = view.slices.iter().map(|s| s.category).collect();
    assert_eq!(cats, CallCategory::ALL.to_vec());
    assert_eq!(view.total, 100.0);
    assert_eq!(view.slices[0].percent, 50.0);
    assert_eq!(view.slices[0].start_angle, -FRAC_PI_2);
    assert_eq!(view.slices[3].sweep, 0.0);

    let swept: f64 = view.slices.iter().map(|s| s.sweep).sum();
    assert!((swept - TAU).abs() < 1e-9);
    assert!((view.slices[1].start_angle - (-FRAC_PI_2 + TAU * 0.5)).abs() < 1e-9);
    assert_eq!(view.slices[1].label(), "AB 25.0%");
}

#[test]
fn empty_summary_renders_zero_slices() {
    let view = SummaryView::from_counts(&AggregateCounts::default());
    assert!(view.is_empty());
    assert!(view.slices.iter().all(|s| s.percent == 0.0 && s.sweep == 0.0));
    let rows = view.table_rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[4], ("Total".to_string(), "0".to_string()));
}

#[test]
fn table_rows_include_total() {
    let counts = AggregateCounts {
        aa: 1200.0,
        ab: 3.0,
        bb: 0.0,
        no_call: 7.0,
    };
    let rows = SummaryView::from_counts(&counts).table_rows();
    assert_eq!(rows[0], ("AA".to_string(), "1,200".to_string()));
    assert_eq!(rows[3], ("NoCall".to_string(), "7".to_string()));
    assert_eq!(rows[4], ("Total".to_string(), "1,210".to_string()));
}

#[test]
fn count_formatting() {
    assert_eq!(format_count(0.0), "0");
    assert_eq!(format_count(999.0), "999");
    assert_eq!(format_count(1234567.0), "1,234,567");
    assert_eq!(format_count(2.5), "2.5");
    assert_eq!(format_count(0.1234), "0.123");
    assert_eq!(format_count(-1500.0), "-1,500");
}
