use thiserror::Error;

/// Failure to turn JSON text into a progress mapping.
///
/// This is the only way building a `ProgressSnapshot` can fail: missing keys
/// and wrong-typed values are tolerated, malformed text is not.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid progress JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("progress JSON must be an object, got {0}")]
    NotAMapping(&'static str),
}

#[derive(Debug, Error)]
pub enum Aria2Error {
    #[error("invalid GID")]
    InvalidGid,

    #[error("aria2 request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error object returned by aria2. Displays as the bare message so it can
    /// be shown to users as-is.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("failed to decode aria2 response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("aria2 response carried neither result nor error")]
    EmptyResponse,

    #[error("aria2c is already running")]
    AlreadyRunning,

    #[error("aria2c start failed: {0}")]
    Spawn(std::io::Error),

    #[error("failed to stop aria2c: {0}")]
    Stop(std::io::Error),

    #[error("download {gid} ended as {status}: {message}")]
    DownloadFailed {
        gid: String,
        status: String,
        message: String,
    },
}
