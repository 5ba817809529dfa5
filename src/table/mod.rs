//! Table variant: per-column sort toggles reconciled into one ordering.
//!
//! [`TableSource`] wraps a [`ListSource`] rather than extending it. Column
//! sort changes go through [`ColumnsReducer`] and the resolved ordering is
//! written into the wrapped source's params; orderings that arrive through
//! [`QuerySource::update`] are mirrored back onto the columns.

mod intent;
mod reducer;
mod resolve;
mod state;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::params::{Ordering, ParamsPatch, QueryParams, SortDirection};
use crate::source::{ListSource, QuerySource};

pub use intent::{ColumnIntent, ColumnRef};
pub use reducer::{ColumnsReducer, Reducer};
pub use resolve::{column_for_ordering, ordering_field_name, resolve_ordering, FieldNameTransform};
pub use state::{ColumnDef, ColumnId, ColumnPatch, ColumnsState};

pub struct TableSource<T, F = ()> {
    source: ListSource<T, F>,
    columns: Arc<Mutex<ColumnsState>>,
    transform: Option<FieldNameTransform>,
}

impl<T, F> Clone for TableSource<T, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            columns: Arc::clone(&self.columns),
            transform: self.transform.clone(),
        }
    }
}

impl<T, F> TableSource<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Wrap `source` with the given columns. Column sort state is
    /// initialised from the source's current orderings.
    pub fn new(source: ListSource<T, F>, columns: Vec<ColumnPatch>) -> Self {
        Self::build(source, columns, None)
    }

    /// Like [`new`](Self::new), mapping column field names through
    /// `transform` before they go into an ordering.
    pub fn with_field_transform(
        source: ListSource<T, F>,
        columns: Vec<ColumnPatch>,
        transform: FieldNameTransform,
    ) -> Self {
        Self::build(source, columns, Some(transform))
    }

    fn build(
        source: ListSource<T, F>,
        columns: Vec<ColumnPatch>,
        transform: Option<FieldNameTransform>,
    ) -> Self {
        let state = columns
            .into_iter()
            .fold(ColumnsState::default(), |state, patch| {
                ColumnsReducer::reduce(state, ColumnIntent::Upsert(patch))
            });
        let table = Self {
            source,
            columns: Arc::new(Mutex::new(state)),
            transform,
        };
        if table.columns.lock().active_sort().is_some() {
            table.push_ordering();
        } else {
            table.sync_from_params();
        }
        table
    }

    pub fn source(&self) -> &ListSource<T, F> {
        &self.source
    }

    pub fn columns(&self) -> ColumnsState {
        self.columns.lock().clone()
    }

    /// Apply a column intent and push the resolved ordering into the
    /// source when it changed. Returns the resolved ordering.
    ///
    /// Turning off the last active column sort restores the orderings the
    /// source was constructed with.
    pub fn dispatch(&self, intent: ColumnIntent) -> Vec<Ordering> {
        let (changed, cleared) = {
            let mut columns = self.columns.lock();
            let next = ColumnsReducer::reduce(columns.clone(), intent);
            let changed = *columns != next;
            let cleared = columns.active_sort().is_some() && next.active_sort().is_none();
            *columns = next;
            (changed, cleared)
        };
        if cleared {
            self.restore_unsorted_ordering()
        } else if changed {
            self.push_ordering()
        } else {
            self.source.query_params().orderings
        }
    }

    pub fn upsert_column(&self, patch: ColumnPatch) -> Vec<Ordering> {
        self.dispatch(ColumnIntent::Upsert(patch))
    }

    pub fn set_sort(&self, column: ColumnRef, direction: Option<SortDirection>) -> Vec<Ordering> {
        self.dispatch(ColumnIntent::SetSort { column, direction })
    }

    pub fn toggle_sort(&self, column: ColumnRef) -> Vec<Ordering> {
        self.dispatch(ColumnIntent::ToggleSort(column))
    }

    /// Sort by `orderings` and mirror the primary one onto the columns.
    pub fn sort(&self, orderings: Vec<Ordering>) {
        QuerySource::update(self, ParamsPatch::new().orderings(orderings));
    }

    /// Mirror the source's current primary ordering onto the columns
    /// without writing anything back.
    pub fn sync_from_params(&self) {
        let orderings = self.source.query_params().orderings;
        let mut columns = self.columns.lock();
        let next = match orderings.first() {
            Some(primary) => ColumnIntent::Reflect {
                column: column_for_ordering(columns.columns(), primary, self.transform.as_ref()),
                direction: primary.direction,
            },
            None => ColumnIntent::ClearSort,
        };
        *columns = ColumnsReducer::reduce(columns.clone(), next);
    }

    /// Orderings as the columns see them; the source's orderings when no
    /// column is sorted.
    pub fn resolved_ordering(&self) -> Vec<Ordering> {
        let fallback = self.source.query_params().orderings;
        let columns = self.columns.lock();
        resolve_ordering(columns.columns(), self.transform.as_ref(), &fallback)
    }

    /// Default orderings, or none when a column owns the default primary
    /// ordering (that column is now explicitly unsorted).
    fn restore_unsorted_ordering(&self) -> Vec<Ordering> {
        let defaults = self.source.defaults().orderings;
        let owned = {
            let columns = self.columns.lock();
            defaults
                .first()
                .and_then(|primary| {
                    column_for_ordering(columns.columns(), primary, self.transform.as_ref())
                })
                .is_some()
        };
        let restored = if owned { Vec::new() } else { defaults };
        if restored != self.source.query_params().orderings {
            tracing::debug!(orderings = ?restored, "Column sort cleared");
            self.source.sort(restored.clone());
        }
        restored
    }

    fn push_ordering(&self) -> Vec<Ordering> {
        let current = self.source.query_params().orderings;
        let resolved = {
            let columns = self.columns.lock();
            resolve_ordering(columns.columns(), self.transform.as_ref(), &current)
        };
        if resolved != current {
            tracing::debug!(orderings = ?resolved, "Column sort changed");
            self.source.sort(resolved.clone());
        }
        resolved
    }
}

impl<T, F> QuerySource<F> for TableSource<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    fn query_params(&self) -> QueryParams<F> {
        let mut params = self.source.query_params();
        params.orderings = self.resolved_ordering();
        params
    }

    fn update(&self, patch: ParamsPatch<F>) {
        let touches_orderings = patch.orderings.is_some();
        self.source.update(patch);
        if touches_orderings {
            self.sync_from_params();
        }
    }

    fn subscribe_params(&self) -> watch::Receiver<QueryParams<F>> {
        self.source.params()
    }

    fn subscribe_filter(&self) -> watch::Receiver<Option<F>> {
        self.source.filter_changes()
    }
}
