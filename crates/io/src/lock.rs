//! Cell lock policy and sheet protection
//!
//! [`LockHandler`] decides, per column, whether data cells stay editable once
//! the sheet is protected. Editability comes from two sources: the schema's
//! per-field `editable` declaration, and an optional per-write override set
//! of field names. The override only widens: a field named in the set is
//! forced editable, a field not named falls back to its declaration.
//!
//! The handler cannot know final column positions up front — exclusion and
//! ordering are applied by the writer — so it watches header cells as they
//! are disposed and maps column index → field name by header text. At
//! workbook disposal it walks every populated cell of every sheet, swaps each
//! cell's style for a locked or unlocked variant, and protects the sheets.
//!
//! Styles are shared objects; flipping `locked` on a cell's style in place
//! would change every other cell using it. Each distinct original style is
//! instead cloned once into a (locked, unlocked) pair, cached by identity for
//! the duration of the pass, and cells are repointed at the right variant.

use std::collections::HashSet;

use log::debug;
use rustc_hash::FxHashMap;

use gridport_engine::sheet::FormatLock;
use gridport_engine::style::StyleId;
use gridport_engine::workbook::Workbook;

use crate::schema::Schema;
use crate::writer::{CellContext, WriteHandler};

/// Resolve the field → editable map for one write session.
///
/// With no override set, each non-ignored field keeps its declared default.
/// With an override set, fields named in it are editable; the rest keep
/// their declared default. An empty set therefore behaves exactly like no
/// widening, not like "lock everything". Names that match no field are
/// ignored.
pub fn resolve_editable_fields(
    schema: &Schema,
    overrides: Option<&HashSet<String>>,
) -> FxHashMap<String, bool> {
    let mut editable = FxHashMap::default();

    for field in schema.fields() {
        if field.is_ignored() {
            continue;
        }

        let resolved = match overrides {
            None => field.is_editable(),
            Some(set) => set.contains(field.name()) || field.is_editable(),
        };

        editable.insert(field.name().to_string(), resolved);
    }

    editable
}

/// Session lifecycle. Resolving and Finalizing are transient within a single
/// notification; Done is terminal — a handler is good for one write session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SessionState {
    #[default]
    Uninitialized,
    Resolving,
    Active,
    Finalizing,
    Done,
}

/// Per-session state, owned by the handler for the duration of one write.
#[derive(Debug, Default)]
struct LockSession {
    state: SessionState,
    /// field name → editable, resolved once on the first cell notification.
    field_editable: FxHashMap<String, bool>,
    /// column index → field name, accumulated from header cells.
    column_fields: FxHashMap<usize, String>,
}

/// Write handler that locks non-editable columns and protects the sheets.
pub struct LockHandler {
    schema: Schema,
    editable_overrides: Option<HashSet<String>>,
    enable_protection: bool,
    password: Option<String>,
    session: LockSession,
}

impl LockHandler {
    /// Policy from schema declarations only, protection enabled, no password.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            editable_overrides: None,
            enable_protection: true,
            password: None,
            session: LockSession::default(),
        }
    }

    /// Supply the override set: the named fields are forced editable, all
    /// others keep their schema declaration.
    pub fn with_editable_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.editable_overrides = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable the protection step. Styles are reconciled either
    /// way; only `protect` is skipped.
    pub fn with_protection(mut self, enabled: bool) -> Self {
        self.enable_protection = enabled;
        self
    }

    /// Protect with a password instead of blank.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn should_lock(&self, row: usize, col: usize) -> bool {
        // Header row is always locked
        if row == 0 {
            return true;
        }
        match self.session.column_fields.get(&col) {
            Some(field) => !self.session.field_editable.get(field).copied().unwrap_or(true),
            // Unmapped column: fail open to editable
            None => false,
        }
    }
}

impl WriteHandler for LockHandler {
    fn before_cell_create(&mut self, _ctx: &CellContext) {
        if self.session.state == SessionState::Uninitialized {
            self.session.state = SessionState::Resolving;
            self.session.field_editable =
                resolve_editable_fields(&self.schema, self.editable_overrides.as_ref());
            self.session.state = SessionState::Active;
        }
    }

    fn after_cell_dispose(&mut self, ctx: &CellContext) {
        if !ctx.header || ctx.row != 0 {
            return;
        }
        let Some(text) = ctx.value.as_text() else {
            return;
        };
        if let Some(field) = self.schema.field_by_header(text) {
            self.session
                .column_fields
                .insert(ctx.col, field.name().to_string());
        }
    }

    fn after_workbook_dispose(&mut self, workbook: &mut Workbook) {
        if self.session.state == SessionState::Done {
            return;
        }
        self.session.state = SessionState::Finalizing;

        let (sheets, styles) = workbook.sheets_and_styles_mut();
        let sheet_count = sheets.len();

        for sheet in sheets.iter_mut() {
            // One cache per sheet, keyed by the cell's original style
            // identity; each distinct original yields exactly one locked and
            // one unlocked clone.
            let mut style_cache: FxHashMap<StyleId, (StyleId, StyleId)> = FxHashMap::default();

            for (row, col) in sheet.cell_positions() {
                let lock = self.should_lock(row, col);

                // A cell without a style has nothing to migrate
                let Some(style_id) = sheet.cell(row, col).and_then(|c| c.style) else {
                    continue;
                };

                let variants = match style_cache.get(&style_id) {
                    Some(&pair) => Some(pair),
                    None => match (
                        styles.derive_with_locked(style_id, true),
                        styles.derive_with_locked(style_id, false),
                    ) {
                        (Some(locked_id), Some(unlocked_id)) => {
                            style_cache.insert(style_id, (locked_id, unlocked_id));
                            Some((locked_id, unlocked_id))
                        }
                        _ => None,
                    },
                };
                let Some((locked_id, unlocked_id)) = variants else {
                    continue;
                };

                sheet.set_style(row, col, if lock { locked_id } else { unlocked_id });
            }

            if self.enable_protection {
                sheet.protect(self.password.as_deref());
                // Protection revokes every format permission; re-grant width
                // and height adjustment. Must come after protect, which
                // resets the grants.
                sheet.set_format_columns_allowed(true);
                sheet.set_format_rows_allowed(true);
            }
        }

        debug!(
            "lock pass: {} sheet(s), {} mapped column(s), {} field(s) in policy",
            sheet_count,
            self.session.column_fields.len(),
            self.session.field_editable.len(),
        );
        self.session.state = SessionState::Done;
    }
}
