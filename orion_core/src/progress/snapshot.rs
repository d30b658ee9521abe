use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;

pub const PROGRESS_KEY: &str = "progress";
pub const DOWNLOAD_SPEED_KEY: &str = "downloadSpeed";
pub const TOTAL_SIZE_KEY: &str = "totalSize";
pub const COMPLETED_SIZE_KEY: &str = "completedSize";
pub const STATUS_KEY: &str = "status";

/// One point-in-time measurement of a download.
///
/// Every field is optional: producers may leave any of them out and a missing
/// key simply reads as `None`. Values are carried exactly as supplied, so
/// `progress` may disagree with `completed_size / total_size` and `status`
/// is opaque text.
///
/// On the wire the keys are `progress`, `downloadSpeed`, `totalSize`,
/// `completedSize` and `status`. Absent fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct ProgressSnapshot {
    /// Fraction complete, nominally in `[0.0, 1.0]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Bytes per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_speed: Option<f64>,
    /// Expected payload size in bytes. Zero or `None` when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<f64>,
    /// Bytes transferred so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ProgressSnapshot {
    /// Build a snapshot from an untyped source.
    ///
    /// | Source              | Result                              |
    /// |---------------------|-------------------------------------|
    /// | `None` / `null`     | all fields absent                   |
    /// | JSON string         | parsed with [`ProgressSnapshot::from_text`] |
    /// | JSON object         | extracted with [`ProgressSnapshot::from_mapping`] |
    /// | number, bool, array | all fields absent (no keys to read) |
    pub fn from_source(source: Option<&Value>) -> Result<Self, SnapshotError> {
        match source {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(text)) => Self::from_text(text),
            Some(Value::Object(mapping)) => Ok(Self::from_mapping(mapping)),
            Some(other) => {
                log::debug!("progress source is a {}; no fields to extract", kind_of(other));
                Ok(Self::default())
            }
        }
    }

    /// Deserialize `text` into a mapping, then extract the fields.
    pub fn from_text(text: &str) -> Result<Self, SnapshotError> {
        let mapping = parse_mapping(text)?;
        Ok(Self::from_mapping(&mapping))
    }

    /// Read the five fields key by key. Never fails: missing keys, `null`s
    /// and values of the wrong type all become `None`.
    pub fn from_mapping(mapping: &Map<String, Value>) -> Self {
        Self {
            progress: field(mapping, PROGRESS_KEY, Value::as_f64),
            download_speed: field(mapping, DOWNLOAD_SPEED_KEY, Value::as_f64),
            total_size: field(mapping, TOTAL_SIZE_KEY, Value::as_f64),
            completed_size: field(mapping, COMPLETED_SIZE_KEY, Value::as_f64),
            status: field(mapping, STATUS_KEY, |v| v.as_str().map(str::to_owned)),
        }
    }
}

impl From<Map<String, Value>> for ProgressSnapshot {
    fn from(mapping: Map<String, Value>) -> Self {
        Self::from_mapping(&mapping)
    }
}

impl From<&Map<String, Value>> for ProgressSnapshot {
    fn from(mapping: &Map<String, Value>) -> Self {
        Self::from_mapping(mapping)
    }
}

impl FromStr for ProgressSnapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

/// Deserialize JSON text into a key/value mapping.
///
/// Fails if the text is not JSON, or is JSON whose top level is not an object.
pub fn parse_mapping(text: &str) -> Result<Map<String, Value>, SnapshotError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(mapping) => Ok(mapping),
        other => Err(SnapshotError::NotAMapping(kind_of(&other))),
    }
}

fn field<T>(
    mapping: &Map<String, Value>,
    key: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = mapping.get(key)?;
    if value.is_null() {
        return None;
    }
    let read_value = read(value);
    if read_value.is_none() {
        log::debug!("ignoring `{}`: unexpected {} value {}", key, kind_of(value), value);
    }
    read_value
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Human-readable byte formatting.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
