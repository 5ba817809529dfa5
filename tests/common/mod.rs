//! Shared test utilities and mock loaders.

#![allow(dead_code, unused_imports)]

pub mod mock_loader;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use viewsource::ListSource;

pub use mock_loader::{Calls, MockLoader};

/// Longer than every default debounce window plus mock latencies.
pub const SETTLE: Duration = Duration::from_millis(1_000);

pub async fn settle() {
    tokio::time::sleep(SETTLE).await;
}

/// `n` rows shaped `{"id": i, "name": "row-i"}`.
pub fn rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"id": i, "name": format!("row-{}", i)}))
        .collect()
}

/// Record every value published on a source's busy channel, starting with
/// the current one.
pub fn record_busy<F>(source: &ListSource<Value, F>) -> Arc<Mutex<Vec<bool>>>
where
    F: Clone + PartialEq + Send + Sync + 'static,
{
    let mut busy = source.busy();
    let seen = Arc::new(Mutex::new(vec![*busy.borrow_and_update()]));
    let out = Arc::clone(&seen);
    tokio::spawn(async move {
        while busy.changed().await.is_ok() {
            let value = *busy.borrow_and_update();
            out.lock().push(value);
        }
    });
    seen
}
