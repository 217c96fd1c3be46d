use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use super::style::StyleTable;

/// A workbook: an ordered collection of sheets plus the shared style table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    styles: StyleTable,
    active_sheet: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Add a sheet with the given name. Returns None if the name is taken.
    pub fn add_sheet_named(&mut self, name: &str) -> Option<usize> {
        if self.sheet_name_exists(name) {
            return None;
        }
        self.sheets.push(Sheet::new(name));
        Some(self.sheets.len() - 1)
    }

    pub fn sheet_name_exists(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet
    }

    pub fn set_active_sheet(&mut self, index: usize) -> bool {
        if index < self.sheets.len() {
            self.active_sheet = index;
            true
        } else {
            false
        }
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    /// Split borrow: sheets and the style table at the same time, for passes
    /// that restyle cells while registering derived styles.
    pub fn sheets_and_styles_mut(&mut self) -> (&mut [Sheet], &mut StyleTable) {
        (&mut self.sheets, &mut self.styles)
    }
}
