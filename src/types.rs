//! Core wire types shared by the remote clients and the scan pipeline.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque instance identifier.
///
/// The control plane emits numeric `Id`s, but nothing downstream relies on
/// that, so ids are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for InstanceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => InstanceId(text),
            RawId::Number(number) => InstanceId(number.to_string()),
        })
    }
}

/// A hosted workload as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(rename = "Id", alias = "id")]
    pub id: InstanceId,
    #[serde(default, deserialize_with = "null_as_false")]
    pub suspended: bool,
}

impl Instance {
    pub fn new(id: impl Into<InstanceId>, suspended: bool) -> Self {
        Self {
            id: id.into(),
            suspended,
        }
    }
}

/// One entry of a node-agent directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension: String,
    /// Free-form tag assigned by the node agent, e.g. `script`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub purpose: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_directory: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_editable: bool,
    /// Human-readable size with a unit suffix (`B`, `KB`, `MB`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub size: String,
}

impl FileRecord {
    /// Plain file with the given name and size.
    pub fn file(name: impl Into<String>, size: impl Into<String>) -> Self {
        let name = name.into();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext))
            .unwrap_or_default();
        Self {
            name,
            extension,
            size: size.into(),
            ..Self::default()
        }
    }

    /// Non-editable directory, the kind the walker descends into.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            size: "0B".to_string(),
            ..Self::default()
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn editable(mut self) -> Self {
        self.is_editable = true;
        self
    }

    /// Whether the walker should descend into this record.
    pub fn is_traversable(&self) -> bool {
        self.is_directory && !self.is_editable
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Timestamped message recorded by the log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// ISO-8601 timestamp with millisecond precision and a `Z` suffix.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp_iso(), self.message)
    }
}
