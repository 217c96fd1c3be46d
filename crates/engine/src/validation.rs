//! Data validation for cells
//!
//! Constrains what users can enter into cells. The write pipeline only emits
//! explicit-list dropdowns, so that is the one rule shape the model carries.
//!
//! Rules are stored per sheet in a [`ValidationStore`] keyed by [`CellRange`];
//! lookup returns the first rule whose range contains the cell.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An explicit-list dropdown rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListValidation {
    /// The allowed values, shown in the dropdown.
    pub options: Vec<String>,
    /// Show the dropdown arrow in the cell.
    pub show_dropdown: bool,
    /// Show an error alert when an entered value is not in the list.
    pub show_error_box: bool,
}

impl ListValidation {
    /// Create a list rule with the dropdown arrow and error alert enabled.
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            show_dropdown: true,
            show_error_box: true,
        }
    }

    /// Set show_dropdown.
    pub fn with_show_dropdown(mut self, show: bool) -> Self {
        self.show_dropdown = show;
        self
    }

    /// Set show_error_box.
    pub fn with_show_error_box(mut self, show: bool) -> Self {
        self.show_error_box = show;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// A rectangular range of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    /// Start row (0-indexed).
    pub start_row: usize,
    /// Start column (0-indexed).
    pub start_col: usize,
    /// End row (inclusive, 0-indexed).
    pub end_row: usize,
    /// End column (inclusive, 0-indexed).
    pub end_col: usize,
}

impl CellRange {
    /// Create a new cell range. Corners are normalized.
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    /// Create a range covering `rows` in a single column.
    pub fn column_span(start_row: usize, end_row: usize, col: usize) -> Self {
        Self::new(start_row, col, end_row, col)
    }

    /// Check if this range contains the given cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row
            && row <= self.end_row
            && col >= self.start_col
            && col <= self.end_col
    }

    /// Check if this range overlaps with another range.
    pub fn overlaps(&self, other: &CellRange) -> bool {
        !(self.end_row < other.start_row
            || self.start_row > other.end_row
            || self.end_col < other.start_col
            || self.start_col > other.end_col)
    }
}

impl PartialOrd for CellRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.start_row, self.start_col, self.end_row, self.end_col)
            .cmp(&(other.start_row, other.start_col, other.end_row, other.end_col))
    }
}

/// Storage for validation rules in a sheet.
///
/// Uses a BTreeMap for deterministic ordering. When looking up a rule for a
/// cell, the first rule whose range contains the cell wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStore {
    rules: BTreeMap<CellRange, ListValidation>,
}

impl ValidationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a rule for a range. An existing rule for the exact range is
    /// replaced.
    pub fn set(&mut self, range: CellRange, rule: ListValidation) {
        self.rules.insert(range, rule);
    }

    /// Get the rule that applies to a cell, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<&ListValidation> {
        self.rules
            .iter()
            .find(|(range, _)| range.contains(row, col))
            .map(|(_, rule)| rule)
    }

    /// Iterate over all (range, rule) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&CellRange, &ListValidation)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
