//! Quiescence windows over watch channels.

use std::time::Duration;

use tokio::sync::watch;

/// Wait until `rx` has seen no new value for a full `window`.
///
/// Every change observed while waiting restarts the window. Returns `false`
/// if the sending side is dropped before the window elapses.
pub(crate) async fn settle<V>(rx: &mut watch::Receiver<V>, window: Duration) -> bool {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(window) => return true,
            changed = rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }
    }
}

/// Wait for the next change on `rx` and then for it to settle.
pub(crate) async fn next_settled<V>(rx: &mut watch::Receiver<V>, window: Duration) -> bool {
    if rx.changed().await.is_err() {
        return false;
    }
    settle(rx, window).await
}
