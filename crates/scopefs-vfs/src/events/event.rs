//! Event types published by the VFS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::Scope;
use crate::watch::ChangeKind;

/// Metadata common to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Unique event id.
    pub event_id: Uuid,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
    /// Component that produced the event.
    pub source: String,
}

impl EventMetadata {
    /// Fresh metadata stamped with the current time.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// Effect reported by a file operation or a native watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum VfsEvent {
    /// A file was written.
    #[serde(rename = "file:write")]
    FileWrite {
        /// Event metadata.
        metadata: EventMetadata,
        /// Logical path.
        path: String,
        /// Scope written to.
        scope: Scope,
        /// File size after the write.
        size: u64,
    },
    /// A file was read.
    #[serde(rename = "file:read")]
    FileRead {
        /// Event metadata.
        metadata: EventMetadata,
        /// Logical path.
        path: String,
        /// Scope the content came from.
        scope: Scope,
        /// Bytes read.
        size: u64,
    },
    /// A file or directory was deleted.
    #[serde(rename = "file:delete")]
    FileDelete {
        /// Event metadata.
        metadata: EventMetadata,
        /// Logical path.
        path: String,
        /// Scope deleted from.
        scope: Scope,
        /// Whether a whole directory tree was removed.
        was_directory: bool,
    },
    /// A watched path changed on disk.
    #[serde(rename = "file:change")]
    FileChange {
        /// Event metadata.
        metadata: EventMetadata,
        /// Logical path of the watched target.
        path: String,
        /// Scope of the watched target.
        scope: Scope,
        /// Kind of change.
        kind: ChangeKind,
        /// Name of the changed entry, when the OS reports one.
        filename: Option<String>,
        /// Subscription that observed the change.
        watch_id: Uuid,
    },
}

impl VfsEvent {
    /// Wire name of the event (`file:write`, `file:read`, ...).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FileWrite { .. } => "file:write",
            Self::FileRead { .. } => "file:read",
            Self::FileDelete { .. } => "file:delete",
            Self::FileChange { .. } => "file:change",
        }
    }

    /// Event metadata.
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::FileWrite { metadata, .. }
            | Self::FileRead { metadata, .. }
            | Self::FileDelete { metadata, .. }
            | Self::FileChange { metadata, .. } => metadata,
        }
    }

    /// Logical path the event concerns.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::FileWrite { path, .. }
            | Self::FileRead { path, .. }
            | Self::FileDelete { path, .. }
            | Self::FileChange { path, .. } => path,
        }
    }

    /// Scope the event concerns.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            Self::FileWrite { scope, .. }
            | Self::FileRead { scope, .. }
            | Self::FileDelete { scope, .. }
            | Self::FileChange { scope, .. } => *scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = VfsEvent::FileWrite {
            metadata: EventMetadata::new("test"),
            path: "notes/a.txt".into(),
            scope: Scope::Task,
            size: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "file:write");
        assert_eq!(json["scope"], "task");
        assert_eq!(json["size"], 5);
        assert!(json["metadata"]["timestamp"].is_string());
        assert_eq!(event.event_type(), "file:write");
    }

    #[test]
    fn test_delete_field_casing() {
        let event = VfsEvent::FileDelete {
            metadata: EventMetadata::new("test"),
            path: "d".into(),
            scope: Scope::Run,
            was_directory: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["wasDirectory"], true);
    }
}
