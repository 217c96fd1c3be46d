// XLSX export of a finished workbook model
//
// One-way serialization: the gridport-engine model is written out with
// rust_xlsxwriter. Styles become Formats (including the locked flag),
// validation stores become dataValidation ranges, comments become notes, and
// recorded protection state is applied last, together with its format
// permissions.

use std::path::Path;
use std::time::Instant;

use rust_xlsxwriter::{
    DataValidation, DataValidationErrorStyle, Format, FormatAlign, Note, ProtectionOptions,
    Workbook as XlsxWorkbook, Worksheet,
};

use gridport_engine::cell::CellValue;
use gridport_engine::comment::CellComment;
use gridport_engine::sheet::Sheet;
use gridport_engine::style::{Alignment, CellStyle};
use gridport_engine::validation::ListValidation;
use gridport_engine::workbook::Workbook;

/// Default cell box in pixels, used to size comment anchors.
const DEFAULT_COL_WIDTH_PX: usize = 64;
const DEFAULT_ROW_HEIGHT_PX: usize = 20;

/// Result of an XLSX export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of sheets exported
    pub sheets_exported: usize,
    /// Total cells exported
    pub cells_exported: usize,
    /// Validation rules exported
    pub validations_exported: usize,
    /// Validation rules skipped (empty or unconvertible option lists)
    pub validations_skipped: usize,
    /// Comments exported
    pub comments_exported: usize,
    /// Sheets that were protected
    pub protected_sheets: usize,
    /// Export duration in milliseconds
    pub export_duration_ms: u128,
    /// Warnings generated during export
    pub warnings: Vec<String>,
}

impl ExportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{}, {} cells",
            self.sheets_exported,
            if self.sheets_exported == 1 { "" } else { "s" },
            self.cells_exported,
        )
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Export a workbook to an XLSX file.
pub fn export(workbook: &Workbook, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();

    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", sheet.name, e))?;

        result.cells_exported += export_sheet_cells(workbook, sheet, worksheet)?;

        let (exported, skipped, warnings) = export_validations(sheet, worksheet)?;
        result.validations_exported += exported;
        result.validations_skipped += skipped;
        result.warnings.extend(warnings);

        result.comments_exported += export_comments(sheet, worksheet)?;

        if export_protection(sheet, worksheet) {
            result.protected_sheets += 1;
        }

        result.sheets_exported += 1;
    }

    // Set active sheet
    if let Ok(ws) = xlsx_workbook.worksheet_from_index(workbook.active_sheet_index()) {
        let _ = ws.set_active(true);
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

/// Build a rust_xlsxwriter Format from a cell style.
fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    format = match style.alignment {
        Alignment::Left => format,
        Alignment::Center => format.set_align(FormatAlign::Center),
        Alignment::Right => format.set_align(FormatAlign::Right),
    };
    // Locked is the Excel default; only the unlocked state needs declaring
    if !style.locked {
        format = format.set_unlocked();
    }
    format
}

fn export_sheet_cells(
    workbook: &Workbook,
    sheet: &Sheet,
    worksheet: &mut Worksheet,
) -> Result<usize, String> {
    let mut cells_exported = 0;

    for ((row, col), cell) in sheet.cells_iter() {
        let row32 = *row as u32;
        let col16 = *col as u16;

        let format = cell
            .style
            .and_then(|id| workbook.styles().get(id))
            .map(build_format);

        match (&cell.value, &format) {
            (CellValue::Empty, Some(format)) => {
                worksheet
                    .write_blank(row32, col16, format)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Empty, None) => continue,
            (CellValue::Text(s), Some(format)) => {
                worksheet
                    .write_string_with_format(row32, col16, s, format)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Text(s), None) => {
                worksheet
                    .write_string(row32, col16, s)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Number(n), Some(format)) => {
                worksheet
                    .write_number_with_format(row32, col16, *n, format)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Number(n), None) => {
                worksheet
                    .write_number(row32, col16, *n)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Bool(b), Some(format)) => {
                worksheet
                    .write_boolean_with_format(row32, col16, *b, format)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
            (CellValue::Bool(b), None) => {
                worksheet
                    .write_boolean(row32, col16, *b)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
        }
        cells_exported += 1;
    }

    Ok(cells_exported)
}

/// Convert a list rule to rust_xlsxwriter DataValidation. Returns None for an
/// empty or unconvertible option list.
fn rule_to_xlsx(rule: &ListValidation) -> Option<DataValidation> {
    if rule.options.is_empty() {
        return None;
    }

    let refs: Vec<&str> = rule.options.iter().map(|s| s.as_str()).collect();
    let mut dv = DataValidation::new().allow_list_strings(&refs).ok()?;

    dv = dv.ignore_blank(true);

    // Excel inverts this flag: showDropDown="1" means HIDE the dropdown, and
    // rust_xlsxwriter's show_dropdown(true) sets that attribute. Pass the
    // opposite of our value.
    if !rule.show_dropdown {
        dv = dv.show_dropdown(true);
    }

    if rule.show_error_box {
        dv = dv.set_error_style(DataValidationErrorStyle::Stop);
    }

    Some(dv)
}

fn export_validations(
    sheet: &Sheet,
    worksheet: &mut Worksheet,
) -> Result<(usize, usize, Vec<String>), String> {
    let mut exported = 0;
    let mut skipped = 0;
    let mut warnings = Vec::new();

    for (range, rule) in sheet.validations().iter() {
        match rule_to_xlsx(rule) {
            Some(dv) => {
                worksheet
                    .add_data_validation(
                        range.start_row as u32,
                        range.start_col as u16,
                        range.end_row as u32,
                        range.end_col as u16,
                        &dv,
                    )
                    .map_err(|e| format!("Failed to add validation: {}", e))?;
                exported += 1;
            }
            None => {
                warnings.push(format!(
                    "Validation at column {} skipped: option list empty or too long",
                    range.start_col,
                ));
                skipped += 1;
            }
        }
    }

    Ok((exported, skipped, warnings))
}

fn export_comments(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<usize, String> {
    let mut exported = 0;

    for (&(row, col), comment) in sheet.comments_iter() {
        let note = build_note(comment);
        worksheet
            .insert_note(row as u32, col as u16, &note)
            .map_err(|e| format!("Failed to add comment ({}, {}): {}", row, col, e))?;
        exported += 1;
    }

    Ok(exported)
}

fn build_note(comment: &CellComment) -> Note {
    let mut note = Note::new(comment.text.as_str()).add_author_prefix(false);
    if let Some(author) = &comment.author {
        note = note.set_author(author.as_str());
    }
    // Size the note box from the anchor's cell spans
    note.set_width((comment.anchor.col_span() * DEFAULT_COL_WIDTH_PX) as u32)
        .set_height((comment.anchor.row_span() * DEFAULT_ROW_HEIGHT_PX) as u32)
}

/// Apply recorded protection state. Returns true if the sheet was protected.
fn export_protection(sheet: &Sheet, worksheet: &mut Worksheet) -> bool {
    let Some(protection) = sheet.protection() else {
        return false;
    };

    match protection.password() {
        Some(password) if !password.is_empty() => {
            worksheet.protect_with_password(password);
        }
        _ => {
            worksheet.protect();
        }
    }

    worksheet.protect_with_options(&ProtectionOptions {
        format_columns: protection.format_columns_allowed(),
        format_rows: protection.format_rows_allowed(),
        ..ProtectionOptions::default()
    });

    true
}
