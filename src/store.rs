//! Authoritative holder of the current query params.

use tokio::sync::watch;

use crate::params::{ParamsPatch, QueryParams};

/// Holds the current [`QueryParams`] and republishes every change.
///
/// The store is the only writer of params. Every `update` notifies
/// subscribers, even when the merged value is unchanged, so a refresh or a
/// re-applied value still reaches the fetch pipeline. The filter slice is
/// published on its own channel and only when it actually changes.
pub struct QueryStateStore<F> {
    defaults: QueryParams<F>,
    params: watch::Sender<QueryParams<F>>,
    filter: watch::Sender<Option<F>>,
}

impl<F> QueryStateStore<F>
where
    F: Clone + PartialEq,
{
    pub fn new(defaults: QueryParams<F>) -> Self {
        let (params, _) = watch::channel(defaults.clone());
        let (filter, _) = watch::channel(defaults.filter.clone());
        Self {
            defaults,
            params,
            filter,
        }
    }

    /// Current params.
    pub fn get(&self) -> QueryParams<F> {
        self.params.borrow().clone()
    }

    /// The params this store was constructed with.
    pub fn defaults(&self) -> &QueryParams<F> {
        &self.defaults
    }

    /// Merge `patch` over the current params and publish the result.
    ///
    /// Precedence is patch, then current, then defaults. No validation is
    /// performed.
    pub fn update(&self, patch: ParamsPatch<F>) -> QueryParams<F> {
        self.params.send_modify(|params| patch.apply_to(params));
        let merged = self.get();
        self.publish_filter(&merged.filter);
        merged
    }

    /// Re-apply the construction defaults.
    pub fn reset(&self) -> QueryParams<F> {
        self.params.send_replace(self.defaults.clone());
        self.publish_filter(&self.defaults.filter);
        self.defaults.clone()
    }

    /// Republish the current params without changing them.
    pub fn touch(&self) {
        self.params.send_modify(|_| {});
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryParams<F>> {
        self.params.subscribe()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<Option<F>> {
        self.filter.subscribe()
    }

    fn publish_filter(&self, next: &Option<F>) {
        self.filter.send_if_modified(|current| {
            if current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
    }
}
