//! Column sort state to ordering, and back.

use std::sync::Arc;

use crate::params::Ordering;

use super::state::{ColumnDef, ColumnId};

/// Maps a column's field name to the name the loader expects
/// (for example `camelCase` to `snake_case`).
pub type FieldNameTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Field name a column sorts by: the explicit override, else the
/// transformed field name, else the raw field name.
pub fn ordering_field_name(column: &ColumnDef, transform: Option<&FieldNameTransform>) -> String {
    if let Some(name) = &column.ordering_field_name {
        return name.clone();
    }
    match transform {
        Some(transform) => transform(&column.field),
        None => column.field.clone(),
    }
}

/// The single-entry ordering implied by the columns, or `fallback` when no
/// column is sorted.
pub fn resolve_ordering(
    columns: &[ColumnDef],
    transform: Option<&FieldNameTransform>,
    fallback: &[Ordering],
) -> Vec<Ordering> {
    columns
        .iter()
        .find_map(|column| {
            column.sort_dir.map(|direction| {
                vec![Ordering {
                    field: ordering_field_name(column, transform),
                    direction,
                }]
            })
        })
        .unwrap_or_else(|| fallback.to_vec())
}

/// The column whose resolved field name matches `ordering`.
pub fn column_for_ordering(
    columns: &[ColumnDef],
    ordering: &Ordering,
    transform: Option<&FieldNameTransform>,
) -> Option<ColumnId> {
    columns
        .iter()
        .find(|column| ordering_field_name(column, transform) == ordering.field)
        .map(|column| column.id)
}
