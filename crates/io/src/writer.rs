//! The write pipeline
//!
//! [`WorkbookWriter`] turns records into a [`Workbook`], one sheet per
//! `write_sheet` call: header row first (resolved column order, bold header
//! style), then data rows. Registered [`WriteHandler`]s are notified at four
//! lifecycle points, strictly in this order per sheet:
//!
//! 1. `after_sheet_create` — sheet exists, nothing written yet
//! 2. `before_cell_create` / `after_cell_dispose` — per cell, header row
//!    first, then data rows top to bottom
//! 3. `after_workbook_dispose` — once, from [`WorkbookWriter::finish`],
//!    after every sheet is fully written
//!
//! Handlers that accumulate per-cell state (the lock pass) rely on this
//! ordering; finishing a writer whose sheets were never written simply gives
//! the handlers nothing to observe.

use std::collections::HashSet;
use std::time::Instant;

use gridport_engine::cell::{Cell, CellValue};
use gridport_engine::sheet::Sheet;
use gridport_engine::style::{CellStyle, StyleId};
use gridport_engine::workbook::Workbook;

use crate::columns::resolve_columns;
use crate::schema::{Record, Schema};

/// Context for sheet-level notifications.
pub struct SheetContext<'a> {
    pub sheet_index: usize,
    /// The field names excluded from this write, as supplied to the writer.
    pub excluded_fields: &'a HashSet<String>,
}

/// Context for cell-level notifications.
pub struct CellContext<'a> {
    pub sheet_index: usize,
    pub row: usize,
    pub col: usize,
    /// True while the header row is being written.
    pub header: bool,
    /// The value written to the cell.
    pub value: &'a CellValue,
}

/// Lifecycle notifications from the write pipeline. All methods default to
/// no-ops; implement the ones the handler cares about.
pub trait WriteHandler {
    fn after_sheet_create(&mut self, _sheet: &mut Sheet, _ctx: &SheetContext) {}

    fn before_cell_create(&mut self, _ctx: &CellContext) {}

    fn after_cell_dispose(&mut self, _ctx: &CellContext) {}

    fn after_workbook_dispose(&mut self, _workbook: &mut Workbook) {}
}

/// Statistics for one write session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub sheets_written: usize,
    pub rows_written: usize,
    pub header_cells_written: usize,
    pub data_cells_written: usize,
    pub write_duration_ms: u128,
}

impl WriteResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{}, {} row{}, {} cells",
            self.sheets_written,
            if self.sheets_written == 1 { "" } else { "s" },
            self.rows_written,
            if self.rows_written == 1 { "" } else { "s" },
            self.header_cells_written + self.data_cells_written,
        )
    }
}

/// Schema-driven workbook writer. One instance = one write session.
pub struct WorkbookWriter {
    schema: Schema,
    exclude: HashSet<String>,
    handlers: Vec<Box<dyn WriteHandler>>,
    workbook: Workbook,
    header_style: Option<StyleId>,
    body_style: Option<StyleId>,
    result: WriteResult,
}

impl WorkbookWriter {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            exclude: HashSet::new(),
            handlers: Vec::new(),
            workbook: Workbook::new(),
            header_style: None,
            body_style: None,
            result: WriteResult::default(),
        }
    }

    /// Exclude fields by name for this session. Applies to every sheet the
    /// session writes.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a lifecycle handler. Handlers are notified in registration
    /// order.
    pub fn with_handler(mut self, handler: impl WriteHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Write one sheet: header row from the resolved columns, then one data
    /// row per record. Returns the sheet index.
    pub fn write_sheet(&mut self, name: &str, rows: &[Record]) -> Result<usize, String> {
        let start = Instant::now();

        let sheet_index = self
            .workbook
            .add_sheet_named(name)
            .ok_or_else(|| format!("Sheet name already in use: '{}'", name))?;

        let header_style = self.ensure_header_style();
        let body_style = self.ensure_body_style();
        let columns = resolve_columns(&self.schema, &self.exclude);

        // Handlers are taken out for the duration of the write so they can be
        // handed &mut contexts while the workbook is borrowed.
        let mut handlers = std::mem::take(&mut self.handlers);

        if let Some(sheet) = self.workbook.sheet_mut(sheet_index) {
            let ctx = SheetContext {
                sheet_index,
                excluded_fields: &self.exclude,
            };
            for handler in handlers.iter_mut() {
                handler.after_sheet_create(sheet, &ctx);
            }
        }

        // Header row
        for meta in &columns {
            let value = CellValue::Text(meta.header.clone());
            Self::write_cell(
                &mut self.workbook,
                &mut handlers,
                sheet_index,
                0,
                meta.index,
                true,
                value,
                header_style,
            );
            self.result.header_cells_written += 1;
        }

        // Data rows
        for (row_offset, record) in rows.iter().enumerate() {
            let row = row_offset + 1;
            for meta in &columns {
                let value = record
                    .get(&meta.field_name)
                    .cloned()
                    .unwrap_or(CellValue::Empty);
                Self::write_cell(
                    &mut self.workbook,
                    &mut handlers,
                    sheet_index,
                    row,
                    meta.index,
                    false,
                    value,
                    body_style,
                );
                self.result.data_cells_written += 1;
            }
            self.result.rows_written += 1;
        }

        self.handlers = handlers;
        self.result.sheets_written += 1;
        self.result.write_duration_ms += start.elapsed().as_millis();
        Ok(sheet_index)
    }

    /// Finish the session: notify handlers that the workbook is complete and
    /// yield it together with the session statistics.
    pub fn finish(mut self) -> (Workbook, WriteResult) {
        let start = Instant::now();

        let mut handlers = std::mem::take(&mut self.handlers);
        for handler in handlers.iter_mut() {
            handler.after_workbook_dispose(&mut self.workbook);
        }

        self.result.write_duration_ms += start.elapsed().as_millis();
        (self.workbook, self.result)
    }

    fn write_cell(
        workbook: &mut Workbook,
        handlers: &mut [Box<dyn WriteHandler>],
        sheet_index: usize,
        row: usize,
        col: usize,
        header: bool,
        value: CellValue,
        style: StyleId,
    ) {
        let ctx = CellContext {
            sheet_index,
            row,
            col,
            header,
            value: &value,
        };
        for handler in handlers.iter_mut() {
            handler.before_cell_create(&ctx);
        }

        if let Some(sheet) = workbook.sheet_mut(sheet_index) {
            sheet.set_cell(row, col, Cell::with_style(value.clone(), style));
        }

        let ctx = CellContext {
            sheet_index,
            row,
            col,
            header,
            value: &value,
        };
        for handler in handlers.iter_mut() {
            handler.after_cell_dispose(&ctx);
        }
    }

    fn ensure_header_style(&mut self) -> StyleId {
        match self.header_style {
            Some(style) => style,
            None => {
                let style = self
                    .workbook
                    .styles_mut()
                    .add(CellStyle::new().with_bold(true));
                self.header_style = Some(style);
                style
            }
        }
    }

    fn ensure_body_style(&mut self) -> StyleId {
        match self.body_style {
            Some(style) => style,
            None => {
                let style = self.workbook.styles_mut().add(CellStyle::new());
                self.body_style = Some(style);
                style
            }
        }
    }
}
