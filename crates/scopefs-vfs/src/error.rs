use thiserror::Error;

/// Virtual filesystem errors.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Scope name is not one of `run`, `task`, `global` (or `auto` for reads).
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Logical path was empty or whitespace-only.
    #[error("Path must not be empty")]
    EmptyPath,

    /// Logical path resolves outside its scope root.
    #[error("Path resolves outside scope root: {0}")]
    PathTraversal(String),

    /// Target file or directory does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempted to remove a scope root directory.
    #[error("Cannot delete the root of scope '{0}'")]
    RootOperation(String),

    /// Task or run identifier cannot be used to build a scope root.
    #[error("Invalid identifier '{value}' for {field}")]
    InvalidIdentifier {
        /// Which identifier was rejected (`task_id` or `run_id`).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Content could not be encoded or decoded with the requested encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Structured content could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Native filesystem watcher failure.
    #[error("Watch error: {0}")]
    Watch(String),

    /// Native IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<notify::Error> for VfsError {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err.to_string())
    }
}

/// Convenience result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;
