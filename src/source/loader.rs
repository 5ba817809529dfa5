//! The loader seam: the engine's only required collaborator.

use std::future::Future;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::params::{ListResult, QueryParams};

/// Turns query params into one page of rows.
///
/// Implementations must be idempotent for identical params: the engine may
/// call them speculatively (prefetch) or repeatedly (refresh).
#[async_trait]
pub trait Loader<T, F>: Send + Sync {
    async fn load(&self, params: QueryParams<F>) -> Result<ListResult<T>, LoadError>;
}

/// Any `Fn(QueryParams<F>) -> impl Future<Output = Result<ListResult<T>, LoadError>>`
/// is a loader.
#[async_trait]
impl<T, F, Func, Fut> Loader<T, F> for Func
where
    Func: Fn(QueryParams<F>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ListResult<T>, LoadError>> + Send + 'static,
    T: Send + 'static,
    F: Send + 'static,
{
    async fn load(&self, params: QueryParams<F>) -> Result<ListResult<T>, LoadError> {
        (self)(params).await
    }
}
