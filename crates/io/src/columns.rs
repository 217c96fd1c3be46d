//! Column resolution
//!
//! Maps a schema's fields to physical column positions: explicit indices win,
//! remaining fields are auto-assigned in declaration order, excluded fields
//! leave no gap. Pure metadata computation, no side effects.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// A resolved field → column mapping for one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub field_name: String,
    pub header: String,
    /// Final 0-based column index, contiguous after exclusion.
    pub index: usize,
}

/// Resolve the columns for `schema`, skipping ignored fields and fields named
/// in `exclude`.
///
/// Pre-exclusion positions: a field's declared index is used as-is; fields
/// without one take the smallest index not declared explicitly by *any* field
/// on the schema (including ignored or excluded ones), with the scan cursor
/// persisting across auto-assignments so two auto-assigned fields never
/// collide. Fields are then ordered by pre-exclusion position — declaration
/// order breaks ties, which also makes duplicate explicit indices
/// deterministic — and renumbered from 0 so exclusion leaves no gaps.
pub fn resolve_columns(schema: &Schema, exclude: &HashSet<String>) -> Vec<ColumnMeta> {
    // Explicit indices block auto-assignment even when their field is
    // ignored or excluded.
    let explicit: Vec<usize> = schema
        .fields()
        .iter()
        .filter_map(|f| f.declared_index())
        .collect();

    let mut auto_cursor = 0usize;
    let mut positioned: Vec<(usize, &str, &str)> = Vec::new();

    for field in schema.fields() {
        if field.is_ignored() || exclude.contains(field.name()) {
            continue;
        }

        let position = match field.declared_index() {
            Some(index) => index,
            None => {
                while explicit.contains(&auto_cursor) {
                    auto_cursor += 1;
                }
                let index = auto_cursor;
                auto_cursor += 1;
                index
            }
        };

        positioned.push((position, field.name(), field.header_text()));
    }

    // Stable sort: duplicate positions keep declaration order.
    positioned.sort_by_key(|&(position, _, _)| position);

    positioned
        .into_iter()
        .enumerate()
        .map(|(index, (_, name, header))| ColumnMeta {
            field_name: name.to_string(),
            header: header.to_string(),
            index,
        })
        .collect()
}
