#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Host tool dispatch over the scoped VFS.
//!
//! Task code never calls the filesystem directly. It invokes named tools
//! (`writeFile`, `readFile`, ...) with a flat JSON parameter object and gets
//! back a JSON envelope: `success: true` plus tool-specific fields, or
//! `{success: false, error, tool, params}` with `content` redacted.

mod delete_file;
mod envelope;
mod file_exists;
mod file_stat;
mod list_files;
mod mkdir;
mod params;
mod read_file;
mod registry;
mod vfs_tree;
mod watch_file;
mod watches;
mod write_file;

pub use delete_file::DeleteFileTool;
pub use envelope::redact_params;
pub use file_exists::FileExistsTool;
pub use file_stat::FileStatTool;
pub use list_files::ListFilesTool;
pub use mkdir::MkdirTool;
pub use params::Params;
pub use read_file::ReadFileTool;
pub use registry::{HostToolRegistry, ToolDefinition};
pub use vfs_tree::VfsTreeTool;
pub use watch_file::WatchFileTool;
pub use watches::WatchTable;
pub use write_file::WriteFileTool;

use std::sync::Arc;

use scopefs_vfs::{ScopedVfs, VfsError};
use serde_json::{Map, Value};

/// A host tool dispatched by name.
#[async_trait::async_trait]
pub trait HostTool: Send + Sync {
    /// Stable tool name used by callers.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Parameters that must be present (and non-null) before dispatch.
    fn required(&self) -> &'static [&'static str] {
        &[]
    }

    /// JSON schema for the tool's parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool. Returns the success fields, without `success`.
    async fn execute(&self, params: &Params, ctx: &ToolContext) -> ToolResult;
}

/// Shared state available to every host tool.
#[derive(Debug)]
pub struct ToolContext {
    /// Filesystem the tools operate on.
    pub vfs: Arc<ScopedVfs>,
    /// Watches kept alive on behalf of callers.
    pub watches: WatchTable,
}

impl ToolContext {
    /// Create a context over `vfs` with no active watches.
    #[must_use]
    pub fn new(vfs: Arc<ScopedVfs>) -> Self {
        Self {
            vfs,
            watches: WatchTable::new(),
        }
    }
}

/// Tool dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// One or more required parameters were absent.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// A parameter had the wrong type or an unsupported value.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// No tool is registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The filesystem operation failed.
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// A result could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Success fields of a tool call.
pub type ToolResult = Result<Map<String, Value>, ToolError>;
