pub mod observer;
pub mod poller;
pub mod snapshot;
pub mod watch_observer;

pub use observer::ProgressObserver;
pub use poller::ProgressPoller;
pub use snapshot::{format_bytes, parse_mapping, ProgressSnapshot};
pub use watch_observer::{WatchObserver, ERROR_STATUS};
