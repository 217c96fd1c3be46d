use serde::{Deserialize, Serialize};

/// Anchor box for a cell comment, in cell coordinates.
///
/// Columns span `[first_col, last_col)` and rows `[first_row, last_row)`,
/// matching how spreadsheet drawing anchors are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAnchor {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl CommentAnchor {
    pub fn new(first_row: usize, last_row: usize, first_col: usize, last_col: usize) -> Self {
        Self {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    /// The fixed-size box used for header comments: the anchor cell plus the
    /// next column, rows 0 through 3.
    pub fn header_box(col: usize) -> Self {
        Self::new(0, 3, col, col + 2)
    }

    pub fn col_span(&self) -> usize {
        self.last_col.saturating_sub(self.first_col)
    }

    pub fn row_span(&self) -> usize {
        self.last_row.saturating_sub(self.first_row)
    }
}

/// A plain-text comment attached to a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellComment {
    pub text: String,
    pub author: Option<String>,
    pub anchor: CommentAnchor,
}

impl CellComment {
    pub fn new(text: impl Into<String>, anchor: CommentAnchor) -> Self {
        Self {
            text: text.into(),
            author: None,
            anchor,
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}
