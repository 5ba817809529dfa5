//! Adapts command-style data sources ("run it, then read the result")
//! into the [`Loader`] shape.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::LoadError;
use crate::params::{ListResult, QueryParams};
use crate::source::Loader;

/// Latest outcome published by a command. `None` until the first run.
pub type CommandOutcome<T> = Option<Result<Vec<T>, LoadError>>;

/// An action that is triggered with params and publishes its result
/// separately.
pub trait CommandSource<P, T>: Send + Sync {
    /// Start a run. Must not block on the result.
    fn trigger(&self, params: P);

    /// Observe results; the current value is the latest result.
    fn results(&self) -> watch::Receiver<CommandOutcome<T>>;
}

/// How the adapter reads the result back after triggering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObserveMode {
    /// Read the latest result right after `trigger` returns. For commands
    /// that run synchronously.
    #[default]
    Immediate,
    /// Wait for the next "result changed" notification after `trigger`.
    Reactive,
}

/// A [`Loader`] backed by a [`CommandSource`]. Results carry no total.
pub struct CommandLoader<C> {
    command: Arc<C>,
    mode: ObserveMode,
}

impl<C> CommandLoader<C> {
    pub fn new(command: Arc<C>, mode: ObserveMode) -> Self {
        Self { command, mode }
    }

    pub fn immediate(command: Arc<C>) -> Self {
        Self::new(command, ObserveMode::Immediate)
    }

    pub fn reactive(command: Arc<C>) -> Self {
        Self::new(command, ObserveMode::Reactive)
    }
}

#[async_trait]
impl<C, T, F> Loader<T, F> for CommandLoader<C>
where
    C: CommandSource<QueryParams<F>, T> + 'static,
    T: Clone + Send + Sync + 'static,
    F: Send + 'static,
{
    async fn load(&self, params: QueryParams<F>) -> Result<ListResult<T>, LoadError> {
        let outcome = match self.mode {
            ObserveMode::Immediate => {
                self.command.trigger(params);
                let latest = self.command.results().borrow().clone();
                latest
            }
            ObserveMode::Reactive => {
                let mut results = self.command.results();
                results.borrow_and_update();
                self.command.trigger(params);
                if results.changed().await.is_err() {
                    return Err(LoadError::SourceClosed);
                }
                let latest = results.borrow_and_update().clone();
                latest
            }
        };

        match outcome {
            Some(Ok(rows)) => Ok(ListResult::rows(rows)),
            Some(Err(err)) => Err(err),
            None => Err(LoadError::NoResult),
        }
    }
}

/// A command built from a synchronous "run and return rows" closure.
///
/// Each trigger runs the closure in place and publishes its outcome.
pub struct FnCommand<P, T> {
    run: Box<dyn Fn(P) -> Result<Vec<T>, LoadError> + Send + Sync>,
    results: watch::Sender<CommandOutcome<T>>,
}

impl<P, T> FnCommand<P, T>
where
    T: Clone + Send + Sync,
{
    pub fn new(run: impl Fn(P) -> Result<Vec<T>, LoadError> + Send + Sync + 'static) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            run: Box::new(run),
            results,
        }
    }

    pub fn latest(&self) -> CommandOutcome<T> {
        self.results.borrow().clone()
    }
}

impl<P, T> CommandSource<P, T> for FnCommand<P, T>
where
    T: Clone + Send + Sync,
{
    fn trigger(&self, params: P) {
        let outcome = (self.run)(params);
        if let Err(err) = &outcome {
            tracing::debug!(error = %err, "Command run failed");
        }
        self.results.send_replace(Some(outcome));
    }

    fn results(&self) -> watch::Receiver<CommandOutcome<T>> {
        self.results.subscribe()
    }
}
