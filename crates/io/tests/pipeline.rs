// End-to-end pipeline tests: schema -> writer -> handlers -> workbook -> xlsx
//
// Mirrors the assessment-export workflow this stack exists for: the same
// schema is written several times for different roles, each time with a
// different exclusion list and editable override set.

use std::collections::HashSet;

use gridport_io::columns::resolve_columns;
use gridport_io::dropdown::DropdownHandler;
use gridport_io::lock::LockHandler;
use gridport_io::schema::{FieldDescriptor, Record, Schema};
use gridport_io::writer::WorkbookWriter;
use gridport_io::xlsx;

use gridport_engine::workbook::Workbook;

fn assessment_schema() -> Schema {
    Schema::new()
        .field(FieldDescriptor::new("item_id").ignore())
        .field(FieldDescriptor::new("category").header("Category").editable(false))
        .field(
            FieldDescriptor::new("difficulty")
                .header("Difficulty")
                .editable(false)
                .options(["Low", "Medium", "High"]),
        )
        .field(
            FieldDescriptor::new("cycle")
                .header("Cycle")
                .editable(false)
                .options_key("cycles"),
        )
        .field(
            FieldDescriptor::new("self_rating")
                .header("Self Rating")
                .editable(false)
                .comment("Score from 0 to 100"),
        )
        .field(
            FieldDescriptor::new("self_comment")
                .header("Self Comment")
                .editable(false),
        )
        .field(
            FieldDescriptor::new("audit_rating")
                .header("Audit Rating")
                .editable(false),
        )
        .field(
            FieldDescriptor::new("audit_comment")
                .header("Audit Comment")
                .editable(false),
        )
}

fn assessment_rows() -> Vec<Record> {
    vec![
        Record::new()
            .with("item_id", 1i64)
            .with("category", "Sales")
            .with("difficulty", "Medium")
            .with("cycle", "Annual")
            .with("self_rating", 85.5)
            .with("self_comment", "Exceeded target by 5%"),
        Record::new()
            .with("item_id", 2i64)
            .with("category", "Marketing")
            .with("difficulty", "High")
            .with("cycle", "Quarterly")
            .with("self_rating", 78.0)
            .with("self_comment", "Met most of the campaign goals"),
    ]
}

fn column_index(workbook: &Workbook, header: &str) -> Option<usize> {
    let sheet = workbook.sheet(0)?;
    (0..=sheet.max_col()?).find(|&col| {
        sheet
            .cell(0, col)
            .map(|c| c.value.display() == header)
            .unwrap_or(false)
    })
}

fn cell_locked(workbook: &Workbook, row: usize, col: usize) -> bool {
    let style_id = workbook
        .sheet(0)
        .unwrap()
        .cell(row, col)
        .unwrap()
        .style
        .unwrap();
    workbook.styles().get(style_id).unwrap().locked
}

/// Draft role: auditors' columns are excluded, only the self-assessment
/// fields are opened for editing.
#[test]
fn draft_export_opens_only_self_fields() {
    let schema = assessment_schema();
    let mut writer = WorkbookWriter::new(schema.clone())
        .exclude(["audit_rating", "audit_comment"])
        .with_handler(LockHandler::new(schema.clone()).with_editable_fields([
            "self_rating",
            "self_comment",
        ]))
        .with_handler(
            DropdownHandler::new(schema).with_options("cycles", ["Annual", "Quarterly", "Monthly"]),
        );

    writer.write_sheet("Assessment", &assessment_rows()).unwrap();
    let (workbook, result) = writer.finish();

    assert_eq!(result.sheets_written, 1);
    assert_eq!(result.rows_written, 2);

    // Excluded columns are absent
    assert!(column_index(&workbook, "Audit Rating").is_none());
    assert!(column_index(&workbook, "Audit Comment").is_none());

    // Overridden fields are editable, the rest stay locked
    let self_rating = column_index(&workbook, "Self Rating").unwrap();
    let self_comment = column_index(&workbook, "Self Comment").unwrap();
    let category = column_index(&workbook, "Category").unwrap();

    for row in 1..=2 {
        assert!(!cell_locked(&workbook, row, self_rating));
        assert!(!cell_locked(&workbook, row, self_comment));
        assert!(cell_locked(&workbook, row, category));
    }

    // Header row is locked without exception
    for col in 0..=workbook.sheet(0).unwrap().max_col().unwrap() {
        assert!(cell_locked(&workbook, 0, col));
    }

    assert!(workbook.sheet(0).unwrap().is_protected());
}

/// Audit role: self columns stay visible but locked, audit columns open,
/// protection carries a password.
#[test]
fn audit_export_opens_audit_fields_with_password() {
    let schema = assessment_schema();
    let mut writer = WorkbookWriter::new(schema.clone()).with_handler(
        LockHandler::new(schema)
            .with_editable_fields(["audit_rating", "audit_comment"])
            .with_password("admin123"),
    );

    writer.write_sheet("Assessment", &assessment_rows()).unwrap();
    let (workbook, _) = writer.finish();

    let audit_rating = column_index(&workbook, "Audit Rating").unwrap();
    let self_rating = column_index(&workbook, "Self Rating").unwrap();

    assert!(!cell_locked(&workbook, 1, audit_rating));
    assert!(cell_locked(&workbook, 1, self_rating));

    let protection = workbook.sheet(0).unwrap().protection().unwrap();
    assert_eq!(protection.password(), Some("admin123"));
    assert!(protection.format_columns_allowed());
    assert!(protection.format_rows_allowed());
}

/// The decorator and the lock pass agree on column positions even when the
/// exclusion list shifts every column.
#[test]
fn dropdowns_follow_excluded_columns() {
    let schema = assessment_schema();
    let exclude: HashSet<String> =
        ["category".to_string(), "audit_rating".to_string()].into_iter().collect();

    let columns = resolve_columns(&schema, &exclude);
    let difficulty_meta = columns.iter().find(|c| c.field_name == "difficulty").unwrap();

    let mut writer = WorkbookWriter::new(schema.clone())
        .exclude(["category", "audit_rating"])
        .with_handler(
            DropdownHandler::new(schema).with_options("cycles", ["Annual", "Quarterly"]),
        );
    writer.write_sheet("Assessment", &assessment_rows()).unwrap();
    let (workbook, _) = writer.finish();

    let sheet = workbook.sheet(0).unwrap();

    // Static options for difficulty, dynamic for cycle, both at the resolved
    // position
    let difficulty = column_index(&workbook, "Difficulty").unwrap();
    assert_eq!(difficulty, difficulty_meta.index);
    let rule = sheet.validations().get(1, difficulty).unwrap();
    assert_eq!(rule.options, vec!["Low", "Medium", "High"]);

    let cycle = column_index(&workbook, "Cycle").unwrap();
    let rule = sheet.validations().get(1, cycle).unwrap();
    assert_eq!(rule.options, vec!["Annual", "Quarterly"]);

    // Header row never carries validation
    assert!(sheet.validations().get(0, difficulty).is_none());

    // The comment landed on the header cell of its resolved column
    let self_rating = column_index(&workbook, "Self Rating").unwrap();
    assert_eq!(
        sheet.comment(0, self_rating).unwrap().text,
        "Score from 0 to 100"
    );
}

/// The whole stack down to a file on disk.
#[test]
fn full_export_to_xlsx_file() {
    let schema = assessment_schema();
    let mut writer = WorkbookWriter::new(schema.clone())
        .exclude(["audit_rating", "audit_comment"])
        .with_handler(
            LockHandler::new(schema.clone())
                .with_editable_fields(["self_rating", "self_comment"])
                .with_password("admin123"),
        )
        .with_handler(
            DropdownHandler::new(schema).with_options("cycles", ["Annual", "Quarterly", "Monthly"]),
        );

    writer.write_sheet("Assessment", &assessment_rows()).unwrap();
    let (workbook, _) = writer.finish();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assessment.xlsx");
    let result = xlsx::export(&workbook, &path).unwrap();

    assert!(path.exists());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    assert_eq!(result.sheets_exported, 1);
    assert_eq!(result.protected_sheets, 1);
    assert_eq!(result.validations_exported, 2);
    assert_eq!(result.comments_exported, 1);
    assert!(!result.has_warnings());
}
