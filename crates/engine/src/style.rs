//! Cell styles with identity semantics
//!
//! Styles live in a workbook-level [`StyleTable`] and cells reference them by
//! [`StyleId`]. Identity is the table index, not the style's value: two
//! value-equal styles registered separately are distinct identities. This
//! matters for the lock pass, which derives locked/unlocked variants per
//! *identity* so that restyling one group of cells can never bleed into
//! another group that happens to share the same visual attributes.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A cell style: visual attributes plus the protection-relevant `locked` flag.
///
/// `locked` defaults to `true`, matching the spreadsheet convention that every
/// cell is locked until a style says otherwise. The flag only takes effect
/// once the owning sheet is protected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
    pub locked: bool,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            alignment: Alignment::Left,
            locked: true,
        }
    }
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set horizontal alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the locked flag.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// Identity of a style in a [`StyleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleId(pub usize);

/// Workbook-level style table — maps StyleId → CellStyle.
///
/// Append-only: `add` never deduplicates, so a returned id is a stable
/// identity for the lifetime of the workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleTable {
    styles: Vec<CellStyle>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style and return its identity.
    pub fn add(&mut self, style: CellStyle) -> StyleId {
        self.styles.push(style);
        StyleId(self.styles.len() - 1)
    }

    pub fn get(&self, id: StyleId) -> Option<&CellStyle> {
        self.styles.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Clone the style at `id` into a new table entry with `locked` set as
    /// given. Returns None if `id` is not present.
    pub fn derive_with_locked(&mut self, id: StyleId, locked: bool) -> Option<StyleId> {
        let derived = self.get(id)?.clone().with_locked(locked);
        Some(self.add(derived))
    }
}
