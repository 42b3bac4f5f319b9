//! Cohort call table interpretation.
//!
//! A table is either in **long** layout (one row per call event, with a label
//! column and an optional count column) or in **wide** layout (one row per
//! marker, with call tokens spread over the remaining columns). The layout is
//! decided from the column names of the first row. Column names are matched
//! case-insensitively and exactly, in a fixed preference order.
//!
//! - [`reader`] – CSV reading with type inference and delimiter detection

pub mod reader;

pub use reader::{TableReader, load_table, read_table};

use crate::labels::normalize_cell;
use crate::model::{AggregateCounts, Cell, Row};
use log::debug;
use serde::Serialize;

/// Label column candidates, in preference order.
pub const LABEL_COLUMNS: &[&str] = &["label", "genotype", "call", "gt"];
/// Count column candidates for long tables, in preference order.
pub const COUNT_COLUMNS: &[&str] = &["count", "n", "freq", "value", "num", "total"];
/// Marker id column candidates for wide tables, in preference order.
pub const ID_COLUMNS: &[&str] = &[
    "snp_id", "snpid", "snp", "id", "rsid", "rs_id", "marker", "locus",
];

/// How a table was interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum TableLayout {
    /// No rows; nothing was inspected.
    Empty,
    Long {
        label_column: String,
        count_column: Option<String>,
    },
    Wide {
        id_column: Option<String>,
        value_columns: Vec<String>,
    },
}

/// Column names of the table, taken from the first row.
pub fn columns(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|r| r.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Find the first candidate name that matches a column (case-insensitive,
/// exact). Returns the column as spelled in the table.
pub fn find_column<'a>(columns: &[&'a str], candidates: &[&str]) -> Option<&'a str> {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    candidates.iter().find_map(|name| {
        let name = name.to_lowercase();
        lowered
            .iter()
            .position(|c| *c == name)
            .map(|i| columns[i])
    })
}

/// Decide the layout of `rows` without aggregating.
pub fn detect_layout(rows: &[Row]) -> TableLayout {
    if rows.is_empty() {
        return TableLayout::Empty;
    }
    let cols = columns(rows);
    if let Some(label) = find_column(&cols, LABEL_COLUMNS) {
        return TableLayout::Long {
            label_column: label.to_string(),
            count_column: find_column(&cols, COUNT_COLUMNS).map(str::to_string),
        };
    }
    let id = find_column(&cols, ID_COLUMNS).or_else(|| cols.first().copied());
    TableLayout::Wide {
        id_column: id.map(str::to_string),
        value_columns: cols
            .iter()
            .filter(|c| Some(**c) != id)
            .map(|c| c.to_string())
            .collect(),
    }
}

/// Aggregate call counts over `rows`.
pub fn interpret(rows: &[Row]) -> AggregateCounts {
    interpret_with_layout(rows).0
}

/// Aggregate call counts and report the layout that was used.
pub fn interpret_with_layout(rows: &[Row]) -> (AggregateCounts, TableLayout) {
    let layout = detect_layout(rows);
    let mut sums = AggregateCounts::default();
    match &layout {
        TableLayout::Empty => {}
        TableLayout::Long {
            label_column,
            count_column,
        } => {
            debug!(
                "Long layout: label column '{}', count column {:?}",
                label_column, count_column
            );
            for row in rows {
                let Some(category) = row.get(label_column).and_then(normalize_cell) else {
                    continue;
                };
                let quantity = match count_column {
                    Some(c) => row.get(c).map_or(1.0, Cell::quantity),
                    None => 1.0,
                };
                sums.add(category, quantity);
            }
        }
        TableLayout::Wide {
            id_column,
            value_columns,
        } => {
            debug!(
                "Wide layout: id column {:?}, {} value columns",
                id_column,
                value_columns.len()
            );
            for row in rows {
                for c in value_columns {
                    if let Some(category) = row.get(c).and_then(normalize_cell) {
                        sums.add(category, 1.0);
                    }
                }
            }
        }
    }
    (sums, layout)
}
