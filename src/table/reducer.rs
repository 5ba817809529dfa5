//! Pure `(state, intent) -> state` transitions for table columns.

use crate::params::SortDirection;

use super::intent::{ColumnIntent, ColumnRef};
use super::state::{ColumnDef, ColumnId, ColumnPatch, ColumnsState};

/// The only place column state transitions happen.
pub trait Reducer {
    /// Snapshot type. `PartialEq` lets callers skip work when a reduction
    /// changed nothing.
    type State: Clone + PartialEq + Default;
    type Intent;

    /// Must be pure: no I/O, no shared mutation.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}

pub struct ColumnsReducer;

impl Reducer for ColumnsReducer {
    type State = ColumnsState;
    type Intent = ColumnIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ColumnIntent::Upsert(patch) => upsert(state, patch),
            ColumnIntent::Remove(column) => {
                let mut state = state;
                if let Some(index) = state.position(&column) {
                    state.columns.remove(index);
                }
                state
            }
            ColumnIntent::SetSort { column, direction } => match sortable_position(&state, &column) {
                Some(index) => with_sort(state, index, direction),
                None => state,
            },
            ColumnIntent::ToggleSort(column) => match sortable_position(&state, &column) {
                Some(index) => {
                    let next = match state.columns[index].sort_dir {
                        None => Some(SortDirection::Asc),
                        Some(SortDirection::Asc) => Some(SortDirection::Desc),
                        Some(SortDirection::Desc) => None,
                    };
                    with_sort(state, index, next)
                }
                None => state,
            },
            ColumnIntent::ClearSort => clear_sort(state),
            ColumnIntent::Reflect { column, direction } => {
                match column.and_then(|id| state.position(&ColumnRef::Id(id))) {
                    Some(index) => with_sort(state, index, Some(direction)),
                    None => clear_sort(state),
                }
            }
        }
    }
}

fn upsert(mut state: ColumnsState, patch: ColumnPatch) -> ColumnsState {
    let existing = patch
        .id
        .and_then(|id| state.position(&ColumnRef::Id(id)))
        .or_else(|| state.position(&ColumnRef::Field(patch.field.clone())));

    let index = match existing {
        Some(index) => index,
        None => {
            let id = match patch.id {
                Some(id) => {
                    state.next_id = state.next_id.max(id.0 + 1);
                    id
                }
                None => {
                    let id = ColumnId(state.next_id);
                    state.next_id += 1;
                    id
                }
            };
            state.columns.push(ColumnDef {
                id,
                field: patch.field.clone(),
                sortable: false,
                sort_dir: None,
                ordering_field_name: None,
            });
            state.columns.len() - 1
        }
    };

    let column = &mut state.columns[index];
    if !patch.field.is_empty() {
        column.field = patch.field;
    }
    if let Some(sortable) = patch.sortable {
        column.sortable = sortable;
    }
    if let Some(name) = patch.ordering_field_name {
        column.ordering_field_name = name;
    }
    match patch.sort_dir {
        Some(direction) => with_sort(state, index, direction),
        None => state,
    }
}

fn sortable_position(state: &ColumnsState, column: &ColumnRef) -> Option<usize> {
    state
        .position(column)
        .filter(|&index| state.columns[index].sortable)
}

/// Set the sort of one column; a non-null direction clears all others.
fn with_sort(mut state: ColumnsState, index: usize, direction: Option<SortDirection>) -> ColumnsState {
    if direction.is_some() {
        for (i, column) in state.columns.iter_mut().enumerate() {
            if i != index {
                column.sort_dir = None;
            }
        }
    }
    state.columns[index].sort_dir = direction;
    state
}

fn clear_sort(mut state: ColumnsState) -> ColumnsState {
    for column in &mut state.columns {
        column.sort_dir = None;
    }
    state
}
