//! Genotype call label matching.
//!
//! Raw call tokens ("het", "AA", "no-call", "count_bb", ...) are normalized to
//! a [`CallCategory`] by exact comparison after lower-casing and trimming.
//! There is no fuzzy or substring matching.

use crate::model::{CallCategory, Cell};

/// Synonyms accepted for each category, in addition to its lower-cased name.
pub fn synonyms(category: CallCategory) -> &'static [&'static str] {
    match category {
        CallCategory::AA => &["aa", "a a", "n_aa", "count_aa"],
        CallCategory::AB => &["ab", "a b", "het", "n_ab", "count_ab"],
        CallCategory::BB => &["bb", "b b", "n_bb", "count_bb"],
        CallCategory::NoCall => &[
            "nocall",
            "no call",
            "no-call",
            "n_nocall",
            "count_nocall",
            "missing",
            "nocalls",
        ],
    }
}

/// Normalize a raw token to a call category, or `None` when it is not a known
/// name or synonym.
pub fn normalize(raw: &str) -> Option<CallCategory> {
    let token = raw.trim().to_lowercase();
    CallCategory::ALL.into_iter().find(|category| {
        token == category.as_str().to_lowercase() || synonyms(*category).contains(&token.as_str())
    })
}

/// Normalize a table cell. Numbers are matched through their textual form.
pub fn normalize_cell(cell: &Cell) -> Option<CallCategory> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => normalize(s),
        Cell::Number(_) => normalize(&cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn synonym_sets_are_disjoint() {
        let mut seen = HashSet::new();
        for c in CallCategory::ALL {
            let canonical = c.as_str().to_lowercase();
            let mut own: HashSet<&str> = synonyms(c).iter().copied().collect();
            own.insert(canonical.as_str());
            for s in own {
                assert!(seen.insert(s.to_string()), "{} listed twice", s);
            }
        }
    }

    #[test]
    fn synonyms_are_already_normalized() {
        for c in CallCategory::ALL {
            for s in synonyms(c) {
                assert_eq!(*s, s.trim().to_lowercase());
            }
        }
    }
}
