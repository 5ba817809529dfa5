//! Restore saved params once, then save settled changes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::debounce;
use crate::params::{deep_equal_json, to_json};
use crate::source::QuerySource;

use super::ParamsStore;

#[derive(Debug, Clone)]
pub struct PersistOptions {
    pub debounce: Duration,
    pub equality_depth: usize,
}

impl PersistOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            debounce: config.persist_debounce(),
            equality_depth: config.equality_depth,
        }
    }
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Seeds a source from saved params once, then saves settled changes.
///
/// Load phase: a failed load or an empty result leaves the defaults alone.
/// A loaded patch is applied with one scheduler tick of settling before and
/// after, and the applied value becomes the baseline so it is not saved
/// straight back.
///
/// Watch phase: every debounced params value that differs structurally from
/// the last saved one is handed to `save`. Save failures are logged and not
/// retried.
pub struct PersistedParamsSynchronizer {
    loaded: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl PersistedParamsSynchronizer {
    pub fn start<S, F, P>(source: S, store: Arc<P>, options: PersistOptions) -> Self
    where
        S: QuerySource<F> + 'static,
        F: Clone + Serialize + Send + Sync + 'static,
        P: ParamsStore<F> + ?Sized + 'static,
    {
        let (loaded_tx, loaded) = watch::channel(false);
        let task = tokio::spawn(run(source, store, options, loaded_tx));
        Self { loaded, task }
    }

    /// Resolves once the load phase is over, whether or not anything was
    /// applied.
    pub async fn wait_loaded(&self) {
        let mut loaded = self.loaded.clone();
        let _ = loaded.wait_for(|done| *done).await;
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }
}

impl Drop for PersistedParamsSynchronizer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<S, F, P>(source: S, store: Arc<P>, options: PersistOptions, loaded: watch::Sender<bool>)
where
    S: QuerySource<F>,
    F: Clone + Serialize + Send + Sync + 'static,
    P: ParamsStore<F> + ?Sized,
{
    match store.load().await {
        Ok(Some(patch)) if !patch.is_empty() => {
            tokio::task::yield_now().await;
            tracing::debug!("Applying persisted params");
            source.update(patch);
            tokio::task::yield_now().await;
        }
        Ok(_) => tracing::debug!("No persisted params, keeping defaults"),
        Err(err) => tracing::debug!(error = %err, "Ignoring persisted params load failure"),
    }

    let mut params = source.subscribe_params();
    let mut last_saved = to_json(&*params.borrow_and_update());
    loaded.send_replace(true);

    while debounce::next_settled(&mut params, options.debounce).await {
        let current = params.borrow_and_update().clone();
        let snapshot = to_json(&current);
        let unchanged = match (&snapshot, &last_saved) {
            (Some(now), Some(before)) => deep_equal_json(now, before, options.equality_depth),
            _ => false,
        };
        if unchanged {
            continue;
        }

        match store.save(current).await {
            Ok(()) => {
                tracing::debug!("Persisted params");
                last_saved = snapshot;
            }
            Err(err) => tracing::warn!(error = %err, "Failed to persist params"),
        }
    }
}
