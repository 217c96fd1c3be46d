//! Field schemas
//!
//! A [`Schema`] is the statically registered description of how a record type
//! exports to a worksheet: one [`FieldDescriptor`] per field, in declaration
//! order. Everything the column resolver, lock policy and dropdown decorator
//! need is declared here once, up front.
//!
//! Field names must be unique within a schema; lookups return the first
//! match.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use gridport_engine::cell::CellValue;

/// Static export metadata for one field of a record type.
///
/// Built with the chained setters; immutable once placed in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    header: Option<String>,
    index: Option<usize>,
    ignored: bool,
    editable: bool,
    options: Vec<String>,
    options_key: Option<String>,
    comment: Option<String>,
}

impl FieldDescriptor {
    /// A field with default behavior: header = name, auto-positioned,
    /// exported, editable, no dropdown, no comment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            index: None,
            ignored: false,
            editable: true,
            options: Vec::new(),
            options_key: None,
            comment: None,
        }
    }

    /// Set the header text shown in row 0. Defaults to the field name.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Pin the field to an explicit column position (pre-exclusion).
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Exclude the field from the document entirely.
    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Declare whether cells in this column are editable once the sheet is
    /// protected. Defaults to true.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Static dropdown options. Takes precedence over `options_key`.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Key into the caller-supplied dynamic option table.
    pub fn options_key(mut self, key: impl Into<String>) -> Self {
        self.options_key = Some(key.into());
        self
    }

    /// Comment text attached to the header cell.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The header text: the declared header, or the field name.
    pub fn header_text(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.name)
    }

    pub fn declared_index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn static_options(&self) -> &[String] {
        &self.options
    }

    pub fn dynamic_key(&self) -> Option<&str> {
        self.options_key.as_deref()
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether this field declares a dropdown at all, statically or via key.
    pub fn has_select(&self) -> bool {
        !self.options.is_empty() || self.options_key.is_some()
    }
}

/// An ordered, immutable list of field descriptors for one record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Declaration order is the order of `field` calls.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find the non-ignored field whose header text equals `header`.
    /// Blank header text never matches.
    pub fn field_by_header(&self, header: &str) -> Option<&FieldDescriptor> {
        if header.trim().is_empty() {
            return None;
        }
        self.fields
            .iter()
            .filter(|f| !f.ignored)
            .find(|f| f.header_text() == header)
    }
}

/// One row of values, keyed by field name. Fields with no value export as
/// empty cells.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: HashMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
