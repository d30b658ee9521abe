use async_trait::async_trait;
use tokio::sync::watch;

use super::observer::ProgressObserver;
use super::snapshot::ProgressSnapshot;

pub const ERROR_STATUS: &str = "error";

/// Publishes every snapshot on a `watch` channel.
///
/// Any number of consumers can hold a clone of the receiver and wait on
/// `rx.changed().await`; each sees the most recent snapshot. A failure is
/// published as the last snapshot with `status` set to [`ERROR_STATUS`].
pub struct WatchObserver {
    tx: watch::Sender<ProgressSnapshot>,
}

impl WatchObserver {
    /// Returns the observer (to be registered with `ProgressPoller`) and a
    /// receiver that starts out holding an all-absent snapshot.
    pub fn new() -> (Self, watch::Receiver<ProgressSnapshot>) {
        let (tx, rx) = watch::channel(ProgressSnapshot::default());
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ProgressObserver for WatchObserver {
    async fn on_progress(&self, snapshot: &ProgressSnapshot) {
        // send() only fails once every receiver is gone.
        let _ = self.tx.send(snapshot.clone());
    }

    async fn on_complete(&self, snapshot: &ProgressSnapshot) {
        let _ = self.tx.send(snapshot.clone());
    }

    async fn on_error(&self, error: &str) {
        log::error!("[WatchObserver] download error: {}", error);
        self.tx.send_modify(|snap| snap.status = Some(ERROR_STATUS.to_string()));
    }
}
