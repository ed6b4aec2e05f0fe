use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::content::{Encoding, WriteContent};
use crate::events::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventMetadata, VfsEvent};
use crate::path::{PathResolver, join_logical, normalize_logical};
use crate::scope::{Scope, ScopeSelector, ScopeStore, VfsTree};
use crate::types::{
    DeleteOutcome, FileEntry, FileStat, Listing, MkdirOutcome, ReadOutcome, WriteOptions,
    WriteOutcome,
};
use crate::watch::WatchSubscription;
use crate::{VfsError, VfsResult};

/// Construction parameters for a [`ScopedVfs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsOptions {
    /// Directory under which every scope root is placed.
    pub ecosystem_root: PathBuf,
    /// Task the `task` and `run` scopes belong to.
    pub task_id: String,
    /// Run the `run` scope belongs to.
    pub run_id: String,
    /// Emit diagnostics for every dispatched operation.
    pub debug: bool,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl VfsOptions {
    /// Options with debug disabled and the default event capacity.
    pub fn new(
        ecosystem_root: impl Into<PathBuf>,
        task_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            ecosystem_root: ecosystem_root.into(),
            task_id: task_id.into(),
            run_id: run_id.into(),
            debug: false,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Enable or disable diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

/// Scope-partitioned virtual filesystem backed by the host disk.
///
/// Every operation resolves its logical path through the [`PathResolver`]
/// before touching storage, and reports writes, reads and deletes on the
/// instance's [`EventBus`].
#[derive(Debug, Clone)]
pub struct ScopedVfs {
    store: ScopeStore,
    resolver: PathResolver,
    events: EventBus,
    debug: bool,
}

impl ScopedVfs {
    /// Build the VFS and create any missing scope roots.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::InvalidIdentifier` for unusable ids, or an IO error
    /// if a scope root cannot be created.
    pub async fn open(options: VfsOptions) -> VfsResult<Self> {
        let store = ScopeStore::new(&options.ecosystem_root, &options.task_id, &options.run_id)?;
        store.ensure_roots().await?;

        info!(
            root = %options.ecosystem_root.display(),
            task_id = %options.task_id,
            run_id = %options.run_id,
            "Scoped VFS ready"
        );

        Ok(Self {
            resolver: PathResolver::new(store.roots().clone()),
            store,
            events: EventBus::with_capacity(options.event_capacity),
            debug: options.debug,
        })
    }

    /// The scope root owner.
    #[must_use]
    pub fn store(&self) -> &ScopeStore {
        &self.store
    }

    /// The path resolver.
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The event bus file operations publish on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Whether diagnostics were requested at construction.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Per-scope root summaries. Never fails.
    pub async fn tree(&self) -> VfsTree {
        self.store.tree().await
    }

    /// Write `content` to `path` in `scope`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, encoding errors, or IO failures.
    pub async fn write(
        &self,
        path: &str,
        content: impl Into<WriteContent>,
        scope: Scope,
        options: WriteOptions,
    ) -> VfsResult<WriteOutcome> {
        let full_path = self.resolver.resolve_existing(path, scope).await?;
        let bytes = content.into().into_bytes(options.encoding)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if options.append {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&full_path)
                .await?;
            file.write_all(&bytes).await?;
            file.flush().await?;
        } else {
            tokio::fs::write(&full_path, &bytes).await?;
        }

        let size = tokio::fs::metadata(&full_path).await?.len();
        debug!(scope = %scope, path, size, append = options.append, "File written");

        self.events.publish(VfsEvent::FileWrite {
            metadata: EventMetadata::new("vfs"),
            path: path.to_string(),
            scope,
            size,
        });

        Ok(WriteOutcome {
            path: path.to_string(),
            scope,
            size,
            full_path,
        })
    }

    /// Read `path`, either from one scope or by probing `run`, `task`,
    /// `global` in order.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NotFound` on a miss (aggregating every probed scope
    /// for `auto`), resolution errors, or IO failures. Under `auto` only a
    /// miss moves on to the next scope.
    pub async fn read(
        &self,
        path: &str,
        selector: ScopeSelector,
        encoding: Encoding,
    ) -> VfsResult<ReadOutcome> {
        match selector {
            ScopeSelector::Exact(scope) => self.read_in(path, scope, encoding).await,
            ScopeSelector::Auto => {
                // Malformed paths fail the same way in every scope.
                normalize_logical(path)?;

                let mut reasons = Vec::with_capacity(Scope::ALL.len());
                for scope in Scope::ALL {
                    match self.read_in(path, scope, encoding).await {
                        Ok(outcome) => return Ok(outcome),
                        Err(e @ VfsError::NotFound(_)) => {
                            debug!(scope = %scope, path, error = %e, "Auto read miss");
                            reasons.push(format!("{scope}: {e}"));
                        },
                        // Only a miss falls through; traversal or IO failures are final.
                        Err(e) => return Err(e),
                    }
                }
                Err(VfsError::NotFound(format!(
                    "'{path}' not found in any scope ({})",
                    reasons.join("; ")
                )))
            },
        }
    }

    async fn read_in(&self, path: &str, scope: Scope, encoding: Encoding) -> VfsResult<ReadOutcome> {
        let full_path = self
            .resolver
            .resolve_existing(path, scope)
            .await
            .map_err(|e| classify(e, path, scope))?;
        let bytes = tokio::fs::read(&full_path)
            .await
            .map_err(|e| classify(e, path, scope))?;
        let meta = tokio::fs::metadata(&full_path).await?;
        let size = meta.len();

        self.events.publish(VfsEvent::FileRead {
            metadata: EventMetadata::new("vfs"),
            path: path.to_string(),
            scope,
            size,
        });

        Ok(ReadOutcome {
            path: path.to_string(),
            content: encoding.encode(&bytes),
            encoding,
            scope,
            size,
            modified: meta
                .modified()
                .map_or(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH, Into::into),
            full_path,
        })
    }

    /// List the immediate children of the directory at `path`.
    ///
    /// A directory that does not exist yields an empty listing.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, or IO failures such as `path` naming a file.
    pub async fn list(&self, path: &str, scope: Scope) -> VfsResult<Listing> {
        let dir = self.resolver.resolve_existing(path, scope).await?;

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Listing::default()),
            Err(e) => return Err(e.into()),
        };

        let mut listing = Listing::default();
        while let Some(entry) = read_dir.next_entry().await? {
            let meta = match tokio::fs::symlink_metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                },
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let logical = join_logical(path, &name);
            let item = FileEntry::from_metadata(name, logical, scope, &meta);
            if item.is_dir() {
                listing.directories.push(item);
            } else {
                listing.files.push(item);
            }
        }

        listing.files.sort_by(|a, b| a.name.cmp(&b.name));
        listing.directories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Delete a file, or a directory with all its descendants.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NotFound` if nothing exists at `path`,
    /// `VfsError::RootOperation` for the scope root, resolution errors, or IO
    /// failures.
    pub async fn delete(&self, path: &str, scope: Scope) -> VfsResult<DeleteOutcome> {
        if normalize_logical(path)?.as_os_str().is_empty() {
            return Err(VfsError::RootOperation(scope.to_string()));
        }
        let full_path = self
            .resolver
            .resolve_entry(path, scope)
            .await
            .map_err(|e| classify(e, path, scope))?;
        let meta = tokio::fs::symlink_metadata(&full_path)
            .await
            .map_err(|e| classify(e, path, scope))?;

        // A link aliasing the root (`ln -s . self`) must not take the root with it.
        if let Ok(target) = tokio::fs::canonicalize(&full_path).await
            && target == self.resolver.canonical_root(scope).await
        {
            return Err(VfsError::RootOperation(scope.to_string()));
        }

        // Symlinks are removed as links; `remove_dir_all` never sees them.
        let was_directory = meta.is_dir();
        if was_directory {
            tokio::fs::remove_dir_all(&full_path).await?;
        } else {
            tokio::fs::remove_file(&full_path).await?;
        }
        debug!(scope = %scope, path, was_directory, "Deleted");

        self.events.publish(VfsEvent::FileDelete {
            metadata: EventMetadata::new("vfs"),
            path: path.to_string(),
            scope,
            was_directory,
        });

        Ok(DeleteOutcome {
            path: path.to_string(),
            scope,
            was_directory,
        })
    }

    /// Whether anything exists at `path`. Resolution failures count as absent.
    pub async fn exists(&self, path: &str, scope: Scope) -> bool {
        match self.resolver.resolve_existing(path, scope).await {
            Ok(full_path) => tokio::fs::try_exists(&full_path).await.unwrap_or(false),
            Err(e) => {
                debug!(scope = %scope, path, error = %e, "Existence check failed to resolve");
                false
            },
        }
    }

    /// Metadata for `path`.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NotFound` if absent, resolution errors, or IO failures.
    pub async fn stat(&self, path: &str, scope: Scope) -> VfsResult<FileStat> {
        let full_path = self
            .resolver
            .resolve_existing(path, scope)
            .await
            .map_err(|e| classify(e, path, scope))?;
        let meta = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| classify(e, path, scope))?;
        Ok(FileStat::from_metadata(
            path.to_string(),
            scope,
            full_path,
            &meta,
        ))
    }

    /// Create the directory at `path` and any missing ancestors. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, or IO failures such as a file in the way.
    pub async fn mkdir(&self, path: &str, scope: Scope) -> VfsResult<MkdirOutcome> {
        let full_path = self.resolver.resolve_existing(path, scope).await?;
        let existed = tokio::fs::try_exists(&full_path).await.unwrap_or(false);
        tokio::fs::create_dir_all(&full_path).await?;

        Ok(MkdirOutcome {
            path: path.to_string(),
            scope,
            created: !existed,
            full_path,
        })
    }

    /// Arm a non-recursive watch on an existing `path`.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NotFound` if nothing exists at `path`, resolution
    /// errors, or `VfsError::Watch` if the OS watch cannot be created.
    pub async fn watch(&self, path: &str, scope: Scope) -> VfsResult<WatchSubscription> {
        let full_path = self
            .resolver
            .resolve_existing(path, scope)
            .await
            .map_err(|e| classify(e, path, scope))?;
        if !tokio::fs::try_exists(&full_path).await.unwrap_or(false) {
            return Err(not_found(path, scope));
        }
        WatchSubscription::arm(full_path, path.to_string(), scope, self.events.clone())
    }

    /// Root directory of `scope`.
    #[must_use]
    pub fn root(&self, scope: Scope) -> &Path {
        self.store.root(scope)
    }
}

fn not_found(path: &str, scope: Scope) -> VfsError {
    VfsError::NotFound(format!("'{path}' in {scope} scope"))
}

/// Promote IO "not found" failures to `VfsError::NotFound`.
fn classify(err: impl Into<VfsError>, path: &str, scope: Scope) -> VfsError {
    match err.into() {
        VfsError::Io(e) if e.kind() == io::ErrorKind::NotFound => not_found(path, scope),
        other => other,
    }
}
