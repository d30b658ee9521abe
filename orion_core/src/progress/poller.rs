use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::aria2::client::Aria2Client;
use crate::aria2::types::{DownloadState, Gid};
use crate::error::Aria2Error;
use super::observer::ProgressObserver;
use super::snapshot::ProgressSnapshot;

/// Default delay between two `tellStatus` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Follows one aria2 download by polling its status, converts each reply
/// into a `ProgressSnapshot`, and fans out to all registered observers.
///
/// # Lifecycle
///
/// | aria2 reply / event       | Observer method called         | `run()` returns           |
/// |---------------------------|--------------------------------|---------------------------|
/// | `active`, `waiting`, ...  | `on_progress(&snapshot)`       | keeps polling             |
/// | `complete`                | `on_complete(&snapshot)`       | `Ok(snapshot)`            |
/// | `error` / `removed`       | `on_error(&msg)`               | `Err(DownloadFailed)`     |
/// | RPC or transport failure  | `on_error(&msg)`               | `Err(..)`                 |
/// | cancellation token fired  | none                           | `Ok(last snapshot)`       |
pub struct ProgressPoller {
    client: Aria2Client,
    gid: Gid,
    interval: Duration,
    cancel: CancellationToken,
    observers: Vec<Box<dyn ProgressObserver>>,
}

impl ProgressPoller {
    pub fn new(client: Aria2Client, gid: Gid) -> Self {
        Self {
            client,
            gid,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Register an observer. Must be called before `run()`.
    pub fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    /// Token that stops `run()` at its next wait.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Poll until the download reaches a terminal state, polling fails, or
    /// the cancellation token fires.
    pub async fn run(self) -> Result<ProgressSnapshot, Aria2Error> {
        let mut last = ProgressSnapshot::default();

        loop {
            if self.cancel.is_cancelled() {
                return Ok(last);
            }

            let status = match self.client.tell_status(&self.gid).await {
                Ok(status) => status,
                Err(err) => {
                    self.notify_error(&err.to_string()).await;
                    return Err(err);
                }
            };
            let snapshot = status.to_snapshot();

            match status.state() {
                DownloadState::Complete => {
                    for observer in &self.observers {
                        observer.on_complete(&snapshot).await;
                    }
                    return Ok(snapshot);
                }
                DownloadState::Error | DownloadState::Removed => {
                    let message = status.failure_message();
                    self.notify_error(&message).await;
                    return Err(Aria2Error::DownloadFailed {
                        gid: self.gid.to_string(),
                        status: status.status,
                        message,
                    });
                }
                _ => {
                    for observer in &self.observers {
                        observer.on_progress(&snapshot).await;
                    }
                }
            }
            last = snapshot;

            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(last),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    async fn notify_error(&self, message: &str) {
        log::warn!("stopped following {}: {}", self.gid, message);
        for observer in &self.observers {
            observer.on_error(message).await;
        }
    }
}
