//! The list source engine: query params in, debounced fetches out.
//!
//! # Architecture
//!
//! ```text
//! page/sort/filter/update ──→ QueryStateStore ──→ debounce ──→ Loader
//!                                   │                            │
//!                                   └── params / filter          ├── busy
//!                                                                ├── error
//!                                 prefetch_next_page ──→ buffer ─┴── page / page_data
//! ```
//!
//! Every output is a `tokio::sync::watch` channel, so late subscribers
//! always see the most recent value.

mod loader;
mod pipeline;
mod prefetch;

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::error::LoadError;
use crate::params::{ListResult, Ordering, ParamsPatch, QueryParams};
use crate::store::QueryStateStore;

pub use loader::Loader;
pub use prefetch::PrefetchBuffer;

use pipeline::SourceInner;

/// The seam shared by the plain source and its decorators.
///
/// Form bridges and persistence are written against this trait, so they
/// work the same whether they wrap a [`ListSource`] or a table on top of it.
pub trait QuerySource<F>: Send + Sync {
    fn query_params(&self) -> QueryParams<F>;
    fn update(&self, patch: ParamsPatch<F>);
    fn subscribe_params(&self) -> watch::Receiver<QueryParams<F>>;
    fn subscribe_filter(&self) -> watch::Receiver<Option<F>>;
}

/// A paged, sorted, filtered view over rows produced by a [`Loader`].
///
/// Cheap to clone; all clones share one engine. Must be created inside a
/// tokio runtime. The background fetch driver stops once every handle is
/// dropped.
///
/// Command methods never fail. Loader failures surface on [`error`](Self::error)
/// and leave the previously displayed page in place.
pub struct ListSource<T, F = ()> {
    inner: Arc<SourceInner<T, F>>,
}

impl<T, F> Clone for ListSource<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, F> ListSource<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a source with the default engine timings.
    pub fn new(loader: impl Loader<T, F> + 'static, defaults: QueryParams<F>) -> Self {
        Self::with_config(loader, defaults, &EngineConfig::default())
    }

    pub fn with_config(
        loader: impl Loader<T, F> + 'static,
        defaults: QueryParams<F>,
        config: &EngineConfig,
    ) -> Self {
        let store = QueryStateStore::new(defaults);
        let params = store.subscribe();
        let inner = Arc::new(SourceInner::new(store, Arc::new(loader)));
        tokio::spawn(pipeline::drive(
            Arc::downgrade(&inner),
            params,
            config.fetch_debounce(),
        ));
        Self { inner }
    }

    // -- commands ---------------------------------------------------------

    pub fn page(&self, skip: usize, take: usize) {
        self.update(ParamsPatch::new().skip(skip).take(take));
    }

    pub fn sort(&self, orderings: Vec<Ordering>) {
        self.update(ParamsPatch::new().orderings(orderings));
    }

    pub fn filter(&self, value: F) {
        self.update(ParamsPatch::new().filter(value));
    }

    pub fn clear_filter(&self) {
        self.update(ParamsPatch::new().clear_filter());
    }

    pub fn update(&self, patch: ParamsPatch<F>) {
        self.inner.store.update(patch);
    }

    /// Fetch again with the current params, after the usual debounce.
    pub fn refresh(&self) {
        tracing::debug!("Refresh requested");
        self.inner.store.touch();
    }

    pub fn reset(&self) {
        self.inner.store.reset();
    }

    /// Fetch the page after the displayed one without displaying it.
    ///
    /// Rows left over from an earlier prefetch are merged into the displayed
    /// page first. The new rows stay buffered until the next prefetch, an
    /// explicit [`flush_prefetched`](Self::flush_prefetched), or right away
    /// when `is_last` is set. An authoritative fetch discards the buffer.
    pub async fn prefetch_next_page(
        &self,
        skip: usize,
        take: usize,
        is_last: bool,
    ) -> Result<(), LoadError> {
        self.inner.flush_prefetched();

        let epoch = self.inner.prefetch.lock().epoch();
        let params = self
            .inner
            .store
            .get()
            .merged(ParamsPatch::new().skip(skip).take(take).include_total(false));
        tracing::debug!(skip, take, is_last, "Prefetching page");

        match self.inner.loader.load(params).await {
            Ok(result) => {
                let buffered = self.inner.prefetch.lock().append(epoch, &result.data);
                if !buffered {
                    tracing::debug!(skip, "Dropping prefetch overtaken by an authoritative fetch");
                }
            }
            Err(err) => {
                tracing::warn!(skip, take, error = %err, "Prefetch failed");
                self.inner.error.send_replace(Some(err.clone()));
                return Err(err);
            }
        }

        if is_last {
            self.inner.flush_prefetched();
        }
        Ok(())
    }

    /// Merge buffered prefetch rows into the displayed page.
    ///
    /// Returns the number of rows merged.
    pub fn flush_prefetched(&self) -> usize {
        self.inner.flush_prefetched()
    }

    pub fn prefetched_len(&self) -> usize {
        self.inner.prefetch.lock().len()
    }

    /// Load every row matching the current filter and ordering.
    ///
    /// Waits for any in-flight fetch to settle, then calls the loader once
    /// with `skip = 0` and no `take`. Busy, error and the displayed page are
    /// left untouched.
    ///
    /// Only a fetch that has already started is waited for. A param change
    /// still inside its debounce window (including the initial fetch right
    /// after construction) has not set busy yet, so the load runs at once
    /// with the current params.
    pub async fn fetch_all_data(&self) -> Result<ListResult<T>, LoadError> {
        let mut busy = self.inner.busy.subscribe();
        let idle = busy.wait_for(|busy| !*busy).await.is_ok();
        if !idle {
            return Err(LoadError::SourceClosed);
        }

        let params = self
            .inner
            .store
            .get()
            .merged(ParamsPatch::new().skip(0).clear_take());
        tracing::debug!("Fetching all rows");
        self.inner.loader.load(params).await
    }

    // -- queries ----------------------------------------------------------

    pub fn query_params(&self) -> QueryParams<F> {
        self.inner.store.get()
    }

    pub fn defaults(&self) -> QueryParams<F> {
        self.inner.store.defaults().clone()
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.busy.borrow()
    }

    pub fn last_error(&self) -> Option<LoadError> {
        self.inner.error.borrow().clone()
    }

    pub fn current_page(&self) -> Option<ListResult<T>> {
        self.inner.page.borrow().clone()
    }

    pub fn current_data(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.inner.page_data.borrow())
    }

    // -- streams ----------------------------------------------------------

    pub fn busy(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<LoadError>> {
        self.inner.error.subscribe()
    }

    pub fn params(&self) -> watch::Receiver<QueryParams<F>> {
        self.inner.store.subscribe()
    }

    /// Latest displayed page, `None` until the first fetch settles.
    pub fn pages(&self) -> watch::Receiver<Option<ListResult<T>>> {
        self.inner.page.subscribe()
    }

    /// Latest displayed rows, notified only when the row array changes.
    pub fn page_data(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.inner.page_data.subscribe()
    }

    /// The filter slice of the params, notified only when it changes.
    pub fn filter_changes(&self) -> watch::Receiver<Option<F>> {
        self.inner.store.subscribe_filter()
    }
}

impl<T, F> QuerySource<F> for ListSource<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    fn query_params(&self) -> QueryParams<F> {
        ListSource::query_params(self)
    }

    fn update(&self, patch: ParamsPatch<F>) {
        ListSource::update(self, patch);
    }

    fn subscribe_params(&self) -> watch::Receiver<QueryParams<F>> {
        self.params()
    }

    fn subscribe_filter(&self) -> watch::Receiver<Option<F>> {
        self.filter_changes()
    }
}
