//! Scriptable loader that records the params of every call.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use viewsource::{ListResult, LoadError, Loader, QueryParams};

pub type Calls<F> = Arc<Mutex<Vec<QueryParams<F>>>>;

type Respond<F> =
    dyn Fn(usize, &QueryParams<F>) -> (Duration, Result<ListResult<Value>, LoadError>) + Send + Sync;

/// A loader whose latency and outcome are computed per call from the call
/// index and the params.
pub struct MockLoader<F> {
    calls: Calls<F>,
    respond: Box<Respond<F>>,
}

impl<F: Clone + Send + Sync + 'static> MockLoader<F> {
    pub fn new(
        respond: impl Fn(usize, &QueryParams<F>) -> (Duration, Result<ListResult<Value>, LoadError>)
            + Send
            + Sync
            + 'static,
    ) -> (Self, Calls<F>) {
        let calls: Calls<F> = Arc::new(Mutex::new(Vec::new()));
        let loader = Self {
            calls: Arc::clone(&calls),
            respond: Box::new(respond),
        };
        (loader, calls)
    }

    /// Always returns the same rows and total after `delay`.
    pub fn fixed(data: Vec<Value>, total: Option<usize>, delay: Duration) -> (Self, Calls<F>) {
        Self::new(move |_, _| (delay, Ok(ListResult::new(data.clone(), total))))
    }

    /// Returns `[skip, skip + take)` as numbers out of `total` rows.
    pub fn paging(total: usize) -> (Self, Calls<F>) {
        Self::new(move |_, params| {
            let skip = params.skip.unwrap_or(0);
            let take = params.take.unwrap_or(total);
            let data = (skip..(skip + take).min(total)).map(|i| json!(i)).collect();
            (Duration::ZERO, Ok(ListResult::new(data, Some(total))))
        })
    }
}

#[async_trait]
impl<F: Clone + Send + Sync + 'static> Loader<Value, F> for MockLoader<F> {
    async fn load(&self, params: QueryParams<F>) -> Result<ListResult<Value>, LoadError> {
        let (delay, outcome) = {
            let mut calls = self.calls.lock();
            let index = calls.len();
            calls.push(params.clone());
            (self.respond)(index, &params)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
