use async_trait::async_trait;
use super::snapshot::ProgressSnapshot;

/// Receives the snapshots a `ProgressPoller` derives from aria2 status replies.
///
/// For one followed download, `on_progress` fires once per poll while aria2
/// reports it active, waiting or paused. Exactly one of `on_complete` or
/// `on_error` ends the sequence, unless the poller is cancelled first, in
/// which case neither fires.
#[async_trait]
pub trait ProgressObserver: Send + Sync + 'static {
    async fn on_progress(&self, snapshot: &ProgressSnapshot);

    /// aria2 reported `complete`; `snapshot` is the final reading.
    async fn on_complete(&self, snapshot: &ProgressSnapshot);

    /// The download ended as `error` or `removed`, or aria2 stopped answering.
    /// `error` is aria2's message when it gave one.
    async fn on_error(&self, error: &str);
}
