//! Dropdown validation and header comments
//!
//! [`DropdownHandler`] decorates a freshly created sheet, before any row is
//! written: per resolved column, it attaches an explicit-list validation rule
//! over the data rows and a comment box on the header cell.
//!
//! Option lists come from the field's static declaration when present,
//! otherwise from the caller-supplied dynamic table via the field's declared
//! key. A field yielding no options is silently skipped.

use std::collections::HashMap;

use log::debug;

use gridport_engine::comment::{CellComment, CommentAnchor};
use gridport_engine::sheet::Sheet;
use gridport_engine::validation::{CellRange, ListValidation};

use crate::columns::resolve_columns;
use crate::schema::Schema;
use crate::writer::{SheetContext, WriteHandler};

/// Last data row (inclusive) that list validation covers by default.
pub const DEFAULT_LAST_ROW: usize = 200;

/// Write handler that attaches dropdowns and header comments.
pub struct DropdownHandler {
    schema: Schema,
    dynamic_options: HashMap<String, Vec<String>>,
    last_row: usize,
}

impl DropdownHandler {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            dynamic_options: HashMap::new(),
            last_row: DEFAULT_LAST_ROW,
        }
    }

    /// Add one entry to the dynamic option table.
    pub fn with_options<I, S>(mut self, key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_options
            .insert(key.into(), options.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the dynamic option table.
    pub fn with_option_table(mut self, table: HashMap<String, Vec<String>>) -> Self {
        self.dynamic_options = table;
        self
    }

    /// Set the last data row (inclusive) covered by validation rules.
    pub fn with_last_row(mut self, last_row: usize) -> Self {
        self.last_row = last_row;
        self
    }

    /// The options for a field: static declaration wins, then the dynamic
    /// table, then none.
    fn options_for(&self, field_name: &str) -> Option<&[String]> {
        let field = self.schema.get(field_name)?;
        if !field.static_options().is_empty() {
            return Some(field.static_options());
        }
        let key = field.dynamic_key()?;
        self.dynamic_options.get(key).map(|v| v.as_slice())
    }
}

impl WriteHandler for DropdownHandler {
    fn after_sheet_create(&mut self, sheet: &mut Sheet, ctx: &SheetContext) {
        let columns = resolve_columns(&self.schema, ctx.excluded_fields);

        for meta in &columns {
            let Some(field) = self.schema.get(&meta.field_name) else {
                continue;
            };

            if field.has_select() {
                let options = self.options_for(&meta.field_name).unwrap_or(&[]);
                if !options.is_empty() {
                    // Row 0 is the header; validation starts at the first
                    // data row.
                    let range = CellRange::column_span(1, self.last_row, meta.index);
                    sheet
                        .validations_mut()
                        .set(range, ListValidation::new(options.to_vec()));
                    debug!(
                        "dropdown: col={} field={} header={} options={}",
                        meta.index,
                        meta.field_name,
                        meta.header,
                        options.len(),
                    );
                }
            }

            if let Some(text) = field.comment_text() {
                sheet.ensure_cell(0, meta.index);
                sheet.set_comment(
                    0,
                    meta.index,
                    CellComment::new(text, CommentAnchor::header_box(meta.index)),
                );
                debug!("comment: col={} field={}", meta.index, meta.field_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;
    use std::collections::HashSet;

    fn run(handler: &mut DropdownHandler, exclude: &[&str]) -> Sheet {
        let mut sheet = Sheet::new("Data");
        let excluded: HashSet<String> = exclude.iter().map(|s| s.to_string()).collect();
        let ctx = SheetContext {
            sheet_index: 0,
            excluded_fields: &excluded,
        };
        handler.after_sheet_create(&mut sheet, &ctx);
        sheet
    }

    #[test]
    fn test_static_options_win_over_dynamic() {
        let schema = Schema::new().field(
            FieldDescriptor::new("stock")
                .options(["A", "B"])
                .options_key("colors"),
        );
        let mut handler =
            DropdownHandler::new(schema).with_options("colors", ["red", "blue"]);
        let sheet = run(&mut handler, &[]);

        let rule = sheet.validations().get(1, 0).unwrap();
        assert_eq!(rule.options, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_dynamic_options_used_when_no_static() {
        let schema = Schema::new().field(FieldDescriptor::new("color").options_key("colors"));
        let mut handler =
            DropdownHandler::new(schema).with_options("colors", ["red", "blue"]);
        let sheet = run(&mut handler, &[]);

        let rule = sheet.validations().get(1, 0).unwrap();
        assert_eq!(rule.options, vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn test_missing_options_silently_skipped() {
        // Declared key has no table entry: no rule, no error
        let schema = Schema::new().field(FieldDescriptor::new("color").options_key("colors"));
        let mut handler = DropdownHandler::new(schema);
        let sheet = run(&mut handler, &[]);

        assert!(sheet.validations().is_empty());
    }

    #[test]
    fn test_field_without_select_gets_no_rule() {
        let schema = Schema::new().field(FieldDescriptor::new("name"));
        let mut handler = DropdownHandler::new(schema);
        let sheet = run(&mut handler, &[]);

        assert!(sheet.validations().is_empty());
    }

    #[test]
    fn test_validation_spans_data_rows_only() {
        let schema = Schema::new().field(FieldDescriptor::new("size").options(["S", "M"]));
        let mut handler = DropdownHandler::new(schema).with_last_row(50);
        let sheet = run(&mut handler, &[]);

        assert!(sheet.validations().get(0, 0).is_none()); // header exempt
        assert!(sheet.validations().get(1, 0).is_some());
        assert!(sheet.validations().get(50, 0).is_some());
        assert!(sheet.validations().get(51, 0).is_none());
    }

    #[test]
    fn test_validation_targets_resolved_column() {
        // "size" sits at column 1 after resolution
        let schema = Schema::new()
            .field(FieldDescriptor::new("id"))
            .field(FieldDescriptor::new("size").options(["S", "M"]));
        let mut handler = DropdownHandler::new(schema);
        let sheet = run(&mut handler, &[]);

        assert!(sheet.validations().get(1, 0).is_none());
        assert!(sheet.validations().get(1, 1).is_some());
    }

    #[test]
    fn test_exclusion_shifts_validation_column() {
        let schema = Schema::new()
            .field(FieldDescriptor::new("id"))
            .field(FieldDescriptor::new("size").options(["S", "M"]));
        let mut handler = DropdownHandler::new(schema);
        let sheet = run(&mut handler, &["id"]);

        assert!(sheet.validations().get(1, 0).is_some());
        assert!(sheet.validations().get(1, 1).is_none());
    }

    #[test]
    fn test_comment_attached_to_header_cell() {
        let schema = Schema::new()
            .field(FieldDescriptor::new("id"))
            .field(FieldDescriptor::new("score").comment("0-100"));
        let mut handler = DropdownHandler::new(schema);
        let sheet = run(&mut handler, &[]);

        // The header cell is created if absent, and the anchor spans the
        // cell plus the next column, rows 0-3
        assert!(sheet.cell(0, 1).is_some());
        let comment = sheet.comment(0, 1).unwrap();
        assert_eq!(comment.text, "0-100");
        assert_eq!(comment.anchor, CommentAnchor::header_box(1));
        assert!(sheet.comment(0, 0).is_none());
    }
}
