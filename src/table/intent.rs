//! Column actions folded by the reducer.

use crate::params::SortDirection;

use super::state::{ColumnId, ColumnPatch};

/// How an intent names its target column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Id(ColumnId),
    Field(String),
}

impl ColumnRef {
    pub fn field(field: impl Into<String>) -> Self {
        ColumnRef::Field(field.into())
    }
}

#[derive(Debug, Clone)]
pub enum ColumnIntent {
    /// Create the column if it is missing, otherwise merge the patch in place.
    /// A non-null `sort_dir` clears it on every other column.
    Upsert(ColumnPatch),
    Remove(ColumnRef),
    /// Set or clear the sort of a sortable column.
    SetSort {
        column: ColumnRef,
        direction: Option<SortDirection>,
    },
    /// Cycle a sortable column through none, ascending, descending.
    ToggleSort(ColumnRef),
    ClearSort,
    /// Mirror an ordering that came from outside (e.g. restored params)
    /// onto the columns. `None` clears every column. Ignores `sortable`.
    Reflect {
        column: Option<ColumnId>,
        direction: SortDirection,
    },
}
