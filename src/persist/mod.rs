//! Persisted query params: backends and the load/watch synchronizer.

mod file;
mod sync;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::PersistError;
use crate::params::{ParamsPatch, QueryParams};

pub use file::JsonFileParamsStore;
pub use sync::{PersistOptions, PersistedParamsSynchronizer};

/// Where saved params come from and go to.
///
/// `load` returning `Ok(None)` (or an empty patch) means nothing was saved.
#[async_trait]
pub trait ParamsStore<F>: Send + Sync {
    async fn load(&self) -> Result<Option<ParamsPatch<F>>, PersistError>;
    async fn save(&self, params: QueryParams<F>) -> Result<(), PersistError>;
}

/// Session-only store that remembers every save.
pub struct MemoryParamsStore<F> {
    initial: Mutex<Option<ParamsPatch<F>>>,
    saved: Mutex<Vec<QueryParams<F>>>,
}

impl<F> MemoryParamsStore<F> {
    pub fn new() -> Self {
        Self {
            initial: Mutex::new(None),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// A store whose first `load` yields `patch`.
    pub fn with_saved(patch: ParamsPatch<F>) -> Self {
        Self {
            initial: Mutex::new(Some(patch)),
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl<F: Clone> MemoryParamsStore<F> {
    pub fn saves(&self) -> Vec<QueryParams<F>> {
        self.saved.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().len()
    }
}

impl<F> Default for MemoryParamsStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F> ParamsStore<F> for MemoryParamsStore<F>
where
    F: Clone + Send + Sync + 'static,
{
    /// The most recent save wins over the initial patch.
    async fn load(&self) -> Result<Option<ParamsPatch<F>>, PersistError> {
        if let Some(last) = self.saved.lock().last() {
            return Ok(Some(ParamsPatch::from(last.clone())));
        }
        Ok(self.initial.lock().clone())
    }

    async fn save(&self, params: QueryParams<F>) -> Result<(), PersistError> {
        self.saved.lock().push(params);
        Ok(())
    }
}
