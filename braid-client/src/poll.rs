use std::{sync::Arc, time::Duration};

use futures::{channel::oneshot, pin_mut, select, FutureExt};
use tokio::sync::Mutex;

use crate::api::Transport;
use crate::ThreadState;

/// Re-fetches the thread on a fixed interval, fully replacing the local
/// tree on every tick, so changes made by other clients show up without any
/// push channel.
///
/// The loop holds the sender half of a oneshot channel and stops as soon as
/// the receiver half is dropped; tie the receiver to the comment view and
/// no timer outlives it. A failed tick keeps the previous tree and is
/// retried at the next interval.
pub async fn poll_comments<A: Transport>(
    mut api: A,
    state: Arc<Mutex<ThreadState>>,
    every: Duration,
    mut cancel: oneshot::Sender<()>,
) {
    loop {
        {
            let tick = tokio::time::sleep(every).fuse();
            let cancelled = cancel.cancellation().fuse();
            pin_mut!(tick, cancelled);
            select! {
                _ = cancelled => {
                    tracing::debug!("comment polling cancelled");
                    return;
                }
                _ = tick => (),
            }
        }
        if let Err(err) = state.lock().await.load(&mut api).await {
            tracing::warn!("polling load failed, keeping previous tree: {err}");
        }
    }
}
