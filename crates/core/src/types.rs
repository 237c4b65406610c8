//! API payload types

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::response::Payload;

/// Server-issued reference to an upload target or a running operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub templated: bool,
}

/// Kind of a disk resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Dir,
    File,
}

/// Metadata for a file or directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub name: String,

    /// Full disk path, e.g. `disk:/docs/report.pdf`
    pub path: String,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    /// Size in bytes (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
}

impl ResourceInfo {
    pub fn is_dir(&self) -> bool {
        self.resource_type == ResourceType::Dir
    }

    /// Human-readable size, e.g. `1 KiB`
    pub fn size_human(&self) -> Option<String> {
        self.size
            .map(|size| humansize::format_size(size, humansize::BINARY))
    }
}

/// Status document returned by an operation's status URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationInfo {
    pub status: String,
}

/// Deserialize a checked payload into a typed value
pub(crate) fn from_payload<T: for<'de> Deserialize<'de>>(payload: Payload) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(payload))?)
}
