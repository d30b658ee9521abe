pub mod aria2;
pub mod config;
pub mod error;
pub mod progress;

pub use config::ClientConfig;
pub use error::{Aria2Error, SnapshotError};
pub use progress::snapshot::ProgressSnapshot;
