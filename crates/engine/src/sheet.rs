use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellValue};
use super::comment::CellComment;
use super::style::StyleId;
use super::validation::ValidationStore;

/// Protection state of a sheet.
///
/// Created by [`Sheet::protect`] with every optional permission revoked —
/// the same default a spreadsheet protection API applies. Permissions are
/// re-granted individually afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetProtection {
    password: Option<String>,
    format_columns_allowed: bool,
    format_rows_allowed: bool,
}

impl SheetProtection {
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn format_columns_allowed(&self) -> bool {
        self.format_columns_allowed
    }

    pub fn format_rows_allowed(&self) -> bool {
        self.format_rows_allowed
    }
}

/// Capability for toggling format permissions on a protected worksheet
/// backend. The toggles only have an effect after protection is enabled;
/// enabling protection resets them.
pub trait FormatLock {
    /// Allow or disallow column-width changes under protection.
    /// Returns false (no effect) if the sheet is not protected.
    fn set_format_columns_allowed(&mut self, allowed: bool) -> bool;

    /// Allow or disallow row-height changes under protection.
    /// Returns false (no effect) if the sheet is not protected.
    fn set_format_rows_allowed(&mut self, allowed: bool) -> bool;
}

/// One worksheet: named, sparsely populated, with per-sheet validation rules,
/// comments and protection state.
///
/// Cells are stored in a BTreeMap so iteration order is deterministic —
/// passes that derive new styles while walking cells produce the same style
/// table on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<(usize, usize), Cell>,
    validations: ValidationStore,
    comments: BTreeMap<(usize, usize), CellComment>,
    protection: Option<SheetProtection>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            validations: ValidationStore::new(),
            comments: BTreeMap::new(),
            protection: None,
        }
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        self.ensure_cell(row, col).value = value.into();
    }

    /// Assign a style to an existing cell. Returns false if the cell does not
    /// exist.
    pub fn set_style(&mut self, row: usize, col: usize, style: StyleId) -> bool {
        match self.cells.get_mut(&(row, col)) {
            Some(cell) => {
                cell.style = Some(style);
                true
            }
            None => false,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Get the cell at (row, col), creating an empty one if absent.
    pub fn ensure_cell(&mut self, row: usize, col: usize) -> &mut Cell {
        self.cells.entry((row, col)).or_default()
    }

    /// Iterate populated cells in (row, col) order.
    pub fn cells_iter(&self) -> impl Iterator<Item = (&(usize, usize), &Cell)> {
        self.cells.iter()
    }

    /// Positions of populated cells in (row, col) order.
    pub fn cell_positions(&self) -> Vec<(usize, usize)> {
        self.cells.keys().copied().collect()
    }

    /// Highest populated row index, or None for an empty sheet.
    pub fn max_row(&self) -> Option<usize> {
        self.cells.keys().map(|&(row, _)| row).max()
    }

    /// Highest populated column index, or None for an empty sheet.
    pub fn max_col(&self) -> Option<usize> {
        self.cells.keys().map(|&(_, col)| col).max()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // ------------------------------------------------------------------
    // Validations
    // ------------------------------------------------------------------

    pub fn validations(&self) -> &ValidationStore {
        &self.validations
    }

    pub fn validations_mut(&mut self) -> &mut ValidationStore {
        &mut self.validations
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub fn set_comment(&mut self, row: usize, col: usize, comment: CellComment) {
        self.comments.insert((row, col), comment);
    }

    pub fn comment(&self, row: usize, col: usize) -> Option<&CellComment> {
        self.comments.get(&(row, col))
    }

    pub fn comments_iter(&self) -> impl Iterator<Item = (&(usize, usize), &CellComment)> {
        self.comments.iter()
    }

    // ------------------------------------------------------------------
    // Protection
    // ------------------------------------------------------------------

    /// Enable protection, optionally with a password.
    ///
    /// All format permissions are revoked at this point, including ones
    /// granted under a previous protection round — grants must happen after
    /// the protect call, not before.
    pub fn protect(&mut self, password: Option<&str>) {
        self.protection = Some(SheetProtection {
            password: password.map(|p| p.to_string()),
            format_columns_allowed: false,
            format_rows_allowed: false,
        });
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    pub fn protection(&self) -> Option<&SheetProtection> {
        self.protection.as_ref()
    }
}

impl FormatLock for Sheet {
    fn set_format_columns_allowed(&mut self, allowed: bool) -> bool {
        match self.protection.as_mut() {
            Some(protection) => {
                protection.format_columns_allowed = allowed;
                true
            }
            None => false,
        }
    }

    fn set_format_rows_allowed(&mut self, allowed: bool) -> bool {
        match self.protection.as_mut() {
            Some(protection) => {
                protection.format_rows_allowed = allowed;
                true
            }
            None => false,
        }
    }
}
