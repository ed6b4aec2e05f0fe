//! Scopefs Virtual File System.
//!
//! A sandboxed, scope-partitioned filesystem for task execution. Every
//! logical path is resolved against one of three scope roots:
//!
//! - `run`: private to one execution attempt
//! - `task`: shared by all runs of a task
//! - `global`: shared by every task under the same ecosystem root
//!
//! Paths that would escape their scope root are rejected before any storage
//! is touched. Writes, reads and deletes are reported on an [`EventBus`],
//! and native watches are bridged onto the same bus.
//!
//! # Example
//!
//! ```rust,no_run
//! use scopefs_vfs::{Encoding, Scope, ScopeSelector, ScopedVfs, VfsOptions, WriteOptions};
//!
//! # async fn example() -> scopefs_vfs::VfsResult<()> {
//! let vfs = ScopedVfs::open(VfsOptions::new("/var/lib/scopefs", "task-1", "run-1")).await?;
//! vfs.write("notes/todo.md", "- ship it", Scope::Task, WriteOptions::new()).await?;
//! let read = vfs.read("notes/todo.md", ScopeSelector::Auto, Encoding::Utf8).await?;
//! assert_eq!(read.scope, Scope::Task);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Content encodings and write payloads.
pub mod content;
/// Virtual filesystem error types.
pub mod error;
/// Change notification: event types, bus and subscribers.
pub mod events;
/// Scope tree export.
mod export;
/// Path resolution and sandboxing utilities.
pub mod path;
/// Scopes and their storage roots.
pub mod scope;
/// Operation options and results.
pub mod types;
/// The scoped filesystem itself.
pub mod vfs;
/// Native filesystem watches.
pub mod watch;

pub use content::{Encoding, WriteContent};
pub use error::{VfsError, VfsResult};
pub use events::{EventBus, EventMetadata, EventReceiver, EventSubscriber, VfsEvent};
pub use path::PathResolver;
pub use scope::{Scope, ScopeRoots, ScopeSelector, ScopeStore, ScopeSummary, VfsTree};
pub use types::{
    DeleteOutcome, EntryKind, ExportSummary, FileEntry, FileStat, Listing, MkdirOutcome,
    ReadOutcome, WriteOptions, WriteOutcome,
};
pub use vfs::{ScopedVfs, VfsOptions};
pub use watch::{ChangeKind, WatchEvent, WatchSubscription};
