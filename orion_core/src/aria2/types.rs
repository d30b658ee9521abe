use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Aria2Error;
use crate::progress::snapshot::ProgressSnapshot;

/// aria2 download identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gid(String);

impl Gid {
    /// Rejects empty or whitespace-only identifiers.
    pub fn new(gid: impl AsRef<str>) -> Result<Self, Aria2Error> {
        let gid = gid.as_ref().trim();
        if gid.is_empty() {
            return Err(Aria2Error::InvalidGid);
        }
        Ok(Self(gid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle states aria2 reports in `tellStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Active,
    Waiting,
    Paused,
    Error,
    Complete,
    Removed,
    Unknown,
}

impl DownloadState {
    pub fn parse(status: &str) -> Self {
        match status {
            "active" => Self::Active,
            "waiting" => Self::Waiting,
            "paused" => Self::Paused,
            "error" => Self::Error,
            "complete" => Self::Complete,
            "removed" => Self::Removed,
            _ => Self::Unknown,
        }
    }

    /// True once aria2 will no longer make progress on the download.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Complete | Self::Removed)
    }
}

/// The part of an `aria2.tellStatus` reply this crate uses.
///
/// aria2 encodes every number as a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TellStatus {
    pub gid: Gid,
    /// Raw status text, e.g. `active` or `complete`.
    pub status: String,
    #[serde(deserialize_with = "decimal")]
    pub total_length: u64,
    #[serde(deserialize_with = "decimal")]
    pub completed_length: u64,
    #[serde(deserialize_with = "decimal")]
    pub download_speed: u64,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
}

impl TellStatus {
    pub fn state(&self) -> DownloadState {
        DownloadState::parse(&self.status)
    }

    /// Convert to the snapshot handed to progress consumers.
    ///
    /// `progress` is `completed / total`, or `0.0` while the total is unknown.
    pub fn to_snapshot(&self) -> ProgressSnapshot {
        let progress = if self.total_length > 0 {
            self.completed_length as f64 / self.total_length as f64
        } else {
            0.0
        };

        ProgressSnapshot {
            progress: Some(progress),
            download_speed: Some(self.download_speed as f64),
            total_size: Some(self.total_length as f64),
            completed_size: Some(self.completed_length as f64),
            status: Some(self.status.clone()),
        }
    }

    /// Best description of why the download stopped, for error reporting.
    pub fn failure_message(&self) -> String {
        match (&self.error_message, &self.error_code) {
            (Some(message), _) if !message.is_empty() => message.clone(),
            (_, Some(code)) => format!("aria2 error code {}", code),
            _ => format!("download {}", self.status),
        }
    }
}

/// Per-download options for `aria2.addUri`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddUriOptions {
    /// Directory to save into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// File name to save as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub enabled_features: Vec<String>,
}

fn decimal<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Text(String),
        Number(u64),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(n) => Ok(n),
        Decimal::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
