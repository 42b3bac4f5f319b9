use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ────────────────────────────────────────────────────────────────────────────
// Call categories
// ────────────────────────────────────────────────────────────────────────────

/// Genotype call category tracked in the cohort summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallCategory {
    AA,
    AB,
    BB,
    NoCall,
}

impl CallCategory {
    /// All categories in display order.
    pub const ALL: [CallCategory; 4] = [
        CallCategory::AA,
        CallCategory::AB,
        CallCategory::BB,
        CallCategory::NoCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CallCategory::AA => "AA",
            CallCategory::AB => "AB",
            CallCategory::BB => "BB",
            CallCategory::NoCall => "NoCall",
        }
    }
}

impl fmt::Display for CallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate counts
// ────────────────────────────────────────────────────────────────────────────

/// Per-category sums produced by one table load.
///
/// Sums are `f64` because long tables may carry fractional frequencies in
/// their count column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateCounts {
    #[serde(rename = "AA")]
    pub aa: f64,
    #[serde(rename = "AB")]
    pub ab: f64,
    #[serde(rename = "BB")]
    pub bb: f64,
    #[serde(rename = "NoCall")]
    pub no_call: f64,
}

impl AggregateCounts {
    pub fn get(&self, category: CallCategory) -> f64 {
        match category {
            CallCategory::AA => self.aa,
            CallCategory::AB => self.ab,
            CallCategory::BB => self.bb,
            CallCategory::NoCall => self.no_call,
        }
    }

    pub fn add(&mut self, category: CallCategory, quantity: f64) {
        let slot = match category {
            CallCategory::AA => &mut self.aa,
            CallCategory::AB => &mut self.ab,
            CallCategory::BB => &mut self.bb,
            CallCategory::NoCall => &mut self.no_call,
        };
        *slot += quantity;
    }

    pub fn total(&self) -> f64 {
        CallCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// `(category, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CallCategory, f64)> + '_ {
        CallCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Table cells and rows
// ────────────────────────────────────────────────────────────────────────────

/// A table cell after type inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell from raw CSV text: blank is `Empty`, finite decimal
    /// literals become `Number`, everything else stays `Text`.
    pub fn infer(raw: &str) -> Cell {
        let t = raw.trim();
        if t.is_empty() {
            return Cell::Empty;
        }
        match parse_number(t) {
            Some(v) => Cell::Number(v),
            None => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Quantity contributed by this cell when used as a count.
    ///
    /// Blank cells fall back to 1; text that is not a number contributes 0.
    pub fn quantity(&self) -> f64 {
        match self {
            Cell::Empty => 1.0,
            Cell::Number(v) if v.is_finite() => *v,
            Cell::Number(_) => 0.0,
            Cell::Text(s) => parse_number(s.trim()).unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

fn parse_number(t: &str) -> Option<f64> {
    // Rust accepts "inf"/"nan" spellings; a table count must contain a digit.
    if !t.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One table row: column name to cell, in header order.
pub type Row = IndexMap<String, Cell>;

// ────────────────────────────────────────────────────────────────────────────
// Cluster hypotheses
// ────────────────────────────────────────────────────────────────────────────

/// Cluster-count hypothesis a diagnostic image was rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClusterK {
    K1,
    K2,
    K3,
}

impl ClusterK {
    pub const ALL: [ClusterK; 3] = [ClusterK::K1, ClusterK::K2, ClusterK::K3];

    pub fn from_digit(d: char) -> Option<ClusterK> {
        match d {
            '1' => Some(ClusterK::K1),
            '2' => Some(ClusterK::K2),
            '3' => Some(ClusterK::K3),
            _ => None,
        }
    }

    /// Zero-based slot index.
    pub fn index(self) -> usize {
        match self {
            ClusterK::K1 => 0,
            ClusterK::K2 => 1,
            ClusterK::K3 => 2,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Display label such as `K=2`.
    pub fn label(self) -> String {
        format!("K={}", self.number())
    }
}

impl fmt::Display for ClusterK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.number())
    }
}

impl FromStr for ClusterK {
    type Err = anyhow::Error;

    /// Accepts `1`, `k1` or `K1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t
            .strip_prefix('k')
            .or_else(|| t.strip_prefix('K'))
            .unwrap_or(t);
        let mut chars = digits.chars();
        match (chars.next(), chars.next()) {
            (Some(d), None) => {
                ClusterK::from_digit(d).ok_or_else(|| anyhow::anyhow!("Invalid K value: {}", s))
            }
            _ => Err(anyhow::anyhow!("Invalid K value: {}", s)),
        }
    }
}
