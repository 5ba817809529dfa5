//! Two-way binding between a form-like value and the filter slot.

mod bridge;

use tokio::sync::watch;

pub use bridge::{ApplyContext, ApplyPredicate, BridgeOptions, FilterFormBridge};

/// Anything that holds a current value, reports changes to it, and can be
/// patched from outside.
pub trait FormBinding<V>: Send + Sync {
    fn value(&self) -> V;
    fn value_changes(&self) -> watch::Receiver<V>;
    fn patch_value(&self, value: V);
}

/// A form backed by a watch channel.
///
/// [`set_value`](Self::set_value) stands in for user input; `patch_value`
/// is the programmatic setter used by the bridge. Both notify observers.
pub struct WatchForm<V> {
    value: watch::Sender<V>,
}

impl<V: Clone + Send + Sync> WatchForm<V> {
    pub fn new(initial: V) -> Self {
        let (value, _) = watch::channel(initial);
        Self { value }
    }

    pub fn set_value(&self, value: V) {
        self.value.send_replace(value);
    }
}

impl<V: Clone + Send + Sync> FormBinding<V> for WatchForm<V> {
    fn value(&self) -> V {
        self.value.borrow().clone()
    }

    fn value_changes(&self) -> watch::Receiver<V> {
        self.value.subscribe()
    }

    fn patch_value(&self, value: V) {
        self.value.send_replace(value);
    }
}
