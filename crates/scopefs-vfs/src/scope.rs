//! Scope names and the per-scope root directories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{VfsError, VfsResult};

/// One of the three isolated storage namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Private to a single run of a task.
    Run,
    /// Shared by every run of the same task.
    Task,
    /// Shared across all tasks.
    Global,
}

impl Scope {
    /// All scopes in `auto` probe order.
    pub const ALL: [Scope; 3] = [Scope::Run, Scope::Task, Scope::Global];

    /// Wire name of the scope.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Task => "task",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Self::Run),
            "task" => Ok(Self::Task),
            "global" => Ok(Self::Global),
            other => Err(VfsError::InvalidScope(other.to_string())),
        }
    }
}

/// Scope argument accepted by reads: a concrete scope or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSelector {
    /// Probe `run`, then `task`, then `global`.
    Auto,
    /// Read from exactly this scope.
    Exact(Scope),
}

impl FromStr for ScopeSelector {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Exact)
        }
    }
}

impl From<Scope> for ScopeSelector {
    fn from(scope: Scope) -> Self {
        Self::Exact(scope)
    }
}

/// Fixed table of scope root directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRoots {
    run: PathBuf,
    task: PathBuf,
    global: PathBuf,
}

impl ScopeRoots {
    /// Compute the scope roots for a task run.
    ///
    /// Layout:
    /// - `global` → `<root>/global`
    /// - `task`   → `<root>/tasks/<task_id>`
    /// - `run`    → `<root>/runs/<task_id>/<run_id>`
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidIdentifier`] if either id is empty or could
    /// name something other than a single directory.
    pub fn new(ecosystem_root: &Path, task_id: &str, run_id: &str) -> VfsResult<Self> {
        validate_identifier("task_id", task_id)?;
        validate_identifier("run_id", run_id)?;

        Ok(Self {
            run: ecosystem_root.join("runs").join(task_id).join(run_id),
            task: ecosystem_root.join("tasks").join(task_id),
            global: ecosystem_root.join("global"),
        })
    }

    /// Root directory of `scope`.
    #[must_use]
    pub fn get(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Run => &self.run,
            Scope::Task => &self.task,
            Scope::Global => &self.global,
        }
    }
}

fn validate_identifier(field: &'static str, value: &str) -> VfsResult<()> {
    let bad = value.trim().is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(VfsError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Aggregate information about one scope root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSummary {
    /// Absolute root directory.
    pub path: PathBuf,
    /// Whether the root currently exists on disk.
    pub exists: bool,
    /// Recursive sum of file sizes under the root, in bytes.
    pub size: u64,
}

/// Per-scope summaries returned by [`ScopeStore::tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsTree {
    /// The `run` scope.
    pub run: ScopeSummary,
    /// The `task` scope.
    pub task: ScopeSummary,
    /// The `global` scope.
    pub global: ScopeSummary,
}

impl VfsTree {
    /// Summary for `scope`.
    #[must_use]
    pub fn get(&self, scope: Scope) -> &ScopeSummary {
        match scope {
            Scope::Run => &self.run,
            Scope::Task => &self.task,
            Scope::Global => &self.global,
        }
    }
}

/// Owner of the three scope root directories.
#[derive(Debug, Clone)]
pub struct ScopeStore {
    roots: ScopeRoots,
    task_id: String,
    run_id: String,
}

impl ScopeStore {
    /// Build the store without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::InvalidIdentifier`] for unusable ids.
    pub fn new(ecosystem_root: &Path, task_id: &str, run_id: &str) -> VfsResult<Self> {
        Ok(Self {
            roots: ScopeRoots::new(ecosystem_root, task_id, run_id)?,
            task_id: task_id.to_string(),
            run_id: run_id.to_string(),
        })
    }

    /// Create every scope root that does not exist yet. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a root cannot be created.
    pub async fn ensure_roots(&self) -> VfsResult<()> {
        for scope in Scope::ALL {
            let root = self.roots.get(scope);
            tokio::fs::create_dir_all(root).await?;
            debug!(scope = %scope, root = %root.display(), "Scope root ready");
        }
        Ok(())
    }

    /// The root table.
    #[must_use]
    pub fn roots(&self) -> &ScopeRoots {
        &self.roots
    }

    /// Root directory of `scope`.
    #[must_use]
    pub fn root(&self, scope: Scope) -> &Path {
        self.roots.get(scope)
    }

    /// Task identifier the `task` and `run` roots are namespaced by.
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Run identifier the `run` root is namespaced by.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Summarize every scope root. Never fails: a missing root reports
    /// `exists: false` and size zero.
    pub async fn tree(&self) -> VfsTree {
        VfsTree {
            run: self.summarize(Scope::Run).await,
            task: self.summarize(Scope::Task).await,
            global: self.summarize(Scope::Global).await,
        }
    }

    async fn summarize(&self, scope: Scope) -> ScopeSummary {
        let path = self.roots.get(scope).to_path_buf();
        let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
        if !exists {
            return ScopeSummary {
                path,
                exists,
                size: 0,
            };
        }

        let walk_root = path.clone();
        let size = match tokio::task::spawn_blocking(move || directory_size(&walk_root)).await {
            Ok(size) => size,
            Err(e) => {
                warn!(scope = %scope, error = %e, "Size walk aborted");
                0
            },
        };

        ScopeSummary { path, exists, size }
    }
}

/// Depth-first sum of regular file sizes below `root`. Unreadable entries count as zero.
fn directory_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .fold(0u64, |acc, meta| acc.saturating_add(meta.len()))
}
