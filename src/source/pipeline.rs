//! Debounced fetch driver with supersession of stale requests.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::debounce;
use crate::error::LoadError;
use crate::params::{ListResult, QueryParams};
use crate::store::QueryStateStore;

use super::loader::Loader;
use super::prefetch::PrefetchBuffer;

/// Shared state behind a `ListSource` handle.
pub(crate) struct SourceInner<T, F> {
    pub(crate) store: QueryStateStore<F>,
    pub(crate) loader: Arc<dyn Loader<T, F>>,
    pub(crate) busy: watch::Sender<bool>,
    pub(crate) error: watch::Sender<Option<LoadError>>,
    pub(crate) page: watch::Sender<Option<ListResult<T>>>,
    pub(crate) page_data: watch::Sender<Arc<Vec<T>>>,
    /// Id of the latest authoritative fetch. Held while publishing so an
    /// older result can never land after a newer one.
    pub(crate) generation: Mutex<u64>,
    pub(crate) prefetch: Mutex<PrefetchBuffer<T>>,
}

impl<T, F> SourceInner<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(store: QueryStateStore<F>, loader: Arc<dyn Loader<T, F>>) -> Self {
        let (busy, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        let (page, _) = watch::channel(None);
        let (page_data, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            store,
            loader,
            busy,
            error,
            page,
            page_data,
            generation: Mutex::new(0),
            prefetch: Mutex::new(PrefetchBuffer::default()),
        }
    }

    /// Start an authoritative fetch, superseding any fetch still in flight.
    ///
    /// The superseded loader call keeps running; its result is dropped when
    /// it arrives.
    fn start_fetch(self: &Arc<Self>, params: QueryParams<F>) {
        let generation = {
            let mut latest = self.generation.lock();
            *latest += 1;
            self.prefetch.lock().discard();
            *latest
        };
        self.busy
            .send_if_modified(|busy| !std::mem::replace(busy, true));

        tracing::debug!(
            generation,
            skip = ?params.skip,
            take = ?params.take,
            orderings = params.orderings.len(),
            "Starting fetch"
        );

        let loader = Arc::clone(&self.loader);
        let source = Arc::downgrade(self);
        tokio::spawn(async move {
            let outcome = loader.load(params).await;
            if let Some(inner) = source.upgrade() {
                inner.finish_fetch(generation, outcome);
            }
        });
    }

    fn finish_fetch(&self, generation: u64, outcome: Result<ListResult<T>, LoadError>) {
        let latest = self.generation.lock();
        if *latest != generation {
            tracing::debug!(
                generation,
                latest = *latest,
                ok = outcome.is_ok(),
                "Discarding superseded fetch result"
            );
            return;
        }

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    generation,
                    rows = result.len(),
                    total = ?result.total,
                    "Fetch settled"
                );
                self.publish_page(result);
                self.error.send_if_modified(|error| error.take().is_some());
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "Loader failed, keeping previous page");
                self.error.send_replace(Some(err));
            }
        }
        self.busy.send_replace(false);
    }

    /// Publish `result` as the displayed page. `page_data` only notifies
    /// when the row array itself is a different allocation.
    pub(crate) fn publish_page(&self, result: ListResult<T>) {
        let data = Arc::clone(&result.data);
        self.page.send_replace(Some(result));
        self.page_data.send_if_modified(|current| {
            if Arc::ptr_eq(current, &data) {
                false
            } else {
                *current = data;
                true
            }
        });
    }

    /// Append buffered prefetch rows to the displayed page.
    pub(crate) fn flush_prefetched(&self) -> usize {
        let _latest = self.generation.lock();
        let rows = self.prefetch.lock().take();
        if rows.is_empty() {
            return 0;
        }

        let current = self.page.borrow().clone();
        let (mut data, total) = match current {
            Some(page) => (page.data.as_ref().clone(), page.total),
            None => (Vec::new(), None),
        };
        let merged = rows.len();
        data.extend(rows);
        self.publish_page(ListResult::new(data, total));
        tracing::debug!(merged, displayed = self.page_data.borrow().len(), "Merged prefetched rows");
        merged
    }
}

/// Turn settled param values into fetches until the source is dropped.
///
/// The value present at construction counts as the first change, so the
/// initial fetch also waits out one window.
pub(crate) async fn drive<T, F>(
    source: Weak<SourceInner<T, F>>,
    mut params: watch::Receiver<QueryParams<F>>,
    window: Duration,
) where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    if !debounce::settle(&mut params, window).await {
        return;
    }
    loop {
        let settled = params.borrow_and_update().clone();
        match source.upgrade() {
            Some(inner) => inner.start_fetch(settled),
            None => return,
        }
        if !debounce::next_settled(&mut params, window).await {
            tracing::trace!("Params channel closed, stopping fetch driver");
            return;
        }
    }
}
