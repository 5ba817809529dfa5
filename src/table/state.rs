//! Column definitions and the table's column state snapshot.

use crate::params::SortDirection;

use super::intent::ColumnRef;

/// Stable identity of a column, independent of its field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub id: ColumnId,
    pub field: String,
    pub sortable: bool,
    pub sort_dir: Option<SortDirection>,
    /// Overrides the field name sent in the ordering.
    pub ordering_field_name: Option<String>,
}

/// Partial column definition used for upserts.
///
/// Matched against existing columns by `id` first, then by `field`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnPatch {
    pub id: Option<ColumnId>,
    pub field: String,
    pub sortable: Option<bool>,
    pub sort_dir: Option<Option<SortDirection>>,
    pub ordering_field_name: Option<Option<String>>,
}

impl ColumnPatch {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: ColumnId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn sort_dir(mut self, sort_dir: Option<SortDirection>) -> Self {
        self.sort_dir = Some(sort_dir);
        self
    }

    pub fn ordering_field_name(mut self, name: impl Into<String>) -> Self {
        self.ordering_field_name = Some(Some(name.into()));
        self
    }
}

/// Column definitions of a table, in display order.
///
/// At most one column has a `sort_dir` at any time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnsState {
    pub(crate) columns: Vec<ColumnDef>,
    pub(crate) next_id: u64,
}

impl ColumnsState {
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn get(&self, column: &ColumnRef) -> Option<&ColumnDef> {
        self.position(column).map(|index| &self.columns[index])
    }

    /// The column currently driving the sort, if any.
    pub fn active_sort(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.sort_dir.is_some())
    }

    pub(crate) fn position(&self, column: &ColumnRef) -> Option<usize> {
        match column {
            ColumnRef::Id(id) => self.columns.iter().position(|c| c.id == *id),
            ColumnRef::Field(field) => self.columns.iter().position(|c| &c.field == field),
        }
    }
}
