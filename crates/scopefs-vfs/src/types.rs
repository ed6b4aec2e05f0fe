//! Values returned by file operations.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Encoding;
use crate::scope::Scope;

/// Options for [`ScopedVfs::write`](crate::ScopedVfs::write).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Encoding applied to text content.
    pub encoding: Encoding,
    /// Append to an existing file instead of replacing it.
    pub append: bool,
}

impl WriteOptions {
    /// Default options: utf8, replace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Append instead of replacing.
    #[must_use]
    pub fn appending(mut self) -> Self {
        self.append = true;
        self
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    /// Logical path as supplied.
    pub path: String,
    /// Scope written to.
    pub scope: Scope,
    /// File size after the write, in bytes.
    pub size: u64,
    /// Resolved absolute path (diagnostic).
    pub full_path: PathBuf,
}

/// Result of a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutcome {
    /// Logical path as supplied.
    pub path: String,
    /// File content rendered with the requested encoding.
    pub content: String,
    /// Encoding used to render `content`.
    pub encoding: Encoding,
    /// Scope the content was found in.
    pub scope: Scope,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Resolved absolute path (diagnostic).
    pub full_path: PathBuf,
}

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or anything that is not a directory).
    File,
    /// Directory.
    Directory,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Entry name.
    pub name: String,
    /// Logical path of the entry.
    pub path: String,
    /// Scope the entry lives in.
    pub scope: Scope,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Creation time, or the modification time where unsupported.
    pub created: DateTime<Utc>,
    /// Extension without the dot (files only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extension: Option<String>,
}

impl FileEntry {
    pub(crate) fn from_metadata(name: String, path: String, scope: Scope, meta: &Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let extension = match kind {
            EntryKind::File => Path::new(&name)
                .extension()
                .map(|e| e.to_string_lossy().into_owned()),
            EntryKind::Directory => None,
        };
        let modified = timestamp(meta.modified());

        Self {
            name,
            path,
            scope,
            kind,
            size: meta.len(),
            modified,
            created: meta.created().map_or(modified, DateTime::from),
            extension,
        }
    }

    /// Whether the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Immediate children of a directory, split by kind and ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// File entries.
    pub files: Vec<FileEntry>,
    /// Directory entries.
    pub directories: Vec<FileEntry>,
}

/// Result of [`ScopedVfs::stat`](crate::ScopedVfs::stat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    /// Logical path as supplied.
    pub path: String,
    /// Scope the target lives in.
    pub scope: Scope,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Creation time, or the modification time where unsupported.
    pub created: DateTime<Utc>,
    /// Last access time, or the modification time where unsupported.
    pub accessed: DateTime<Utc>,
    /// True for regular files.
    pub is_file: bool,
    /// True for directories.
    pub is_directory: bool,
    /// Resolved absolute path (diagnostic).
    pub full_path: PathBuf,
}

impl FileStat {
    pub(crate) fn from_metadata(path: String, scope: Scope, full_path: PathBuf, meta: &Metadata) -> Self {
        let modified = timestamp(meta.modified());
        Self {
            path,
            scope,
            size: meta.len(),
            modified,
            created: meta.created().map_or(modified, DateTime::from),
            accessed: meta.accessed().map_or(modified, DateTime::from),
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
            full_path,
        }
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Logical path as supplied.
    pub path: String,
    /// Scope deleted from.
    pub scope: Scope,
    /// Whether a directory tree was removed.
    pub was_directory: bool,
}

/// Result of a successful mkdir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MkdirOutcome {
    /// Logical path as supplied.
    pub path: String,
    /// Scope the directory lives in.
    pub scope: Scope,
    /// False when the directory already existed.
    pub created: bool,
    /// Resolved absolute path (diagnostic).
    pub full_path: PathBuf,
}

/// Result of [`ScopedVfs::export_tree`](crate::ScopedVfs::export_tree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// `<external_root>/tasks/<task_id>`.
    pub destination: PathBuf,
    /// Scopes whose roots existed and were copied.
    pub scopes: Vec<Scope>,
    /// Number of files copied.
    pub files_copied: u64,
    /// Number of bytes copied.
    pub bytes_copied: u64,
}

fn timestamp(time: io::Result<SystemTime>) -> DateTime<Utc> {
    time.map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::from)
}
