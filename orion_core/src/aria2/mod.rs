//! aria2 JSON-RPC backend: typed replies, the HTTP client and the managed
//! `aria2c` process.

pub mod client;
pub mod daemon;
pub mod types;

pub use client::Aria2Client;
pub use daemon::Aria2Daemon;
pub use types::{AddUriOptions, DownloadState, Gid, TellStatus, VersionInfo};
