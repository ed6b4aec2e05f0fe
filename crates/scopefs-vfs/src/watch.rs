//! Native filesystem watches exposed as closable subscriptions.
//!
//! ```text
//! notify callback (OS watcher thread)
//!   → map EventKind to ChangeKind (access events dropped)
//!   → WatchEvent into the subscription channel
//!   → VfsEvent::FileChange onto the event bus
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::VfsResult;
use crate::events::{EventBus, EventMetadata, VfsEvent};
use crate::scope::Scope;

/// Kind of change observed on a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// An entry was created.
    Created,
    /// Content or metadata changed.
    Modified,
    /// An entry was renamed or moved.
    Renamed,
    /// An entry was removed.
    Removed,
    /// The platform reported an unclassified change.
    Other,
}

impl ChangeKind {
    /// Classify a native event. Returns `None` for pure access notifications.
    #[must_use]
    pub fn from_native(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) => None,
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Renamed),
            EventKind::Modify(_) => Some(Self::Modified),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Any | EventKind::Other => Some(Self::Other),
        }
    }
}

/// One change delivered to a [`WatchSubscription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    /// Kind of change.
    pub kind: ChangeKind,
    /// Name of the changed entry, when reported.
    pub filename: Option<String>,
    /// Logical path of the watched target.
    pub path: String,
    /// Scope of the watched target.
    pub scope: Scope,
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

/// Live watch on one resolved path.
///
/// Owns the OS watch resource until [`close`](Self::close) is called or the
/// subscription is dropped. Buffered events can still be drained after
/// closing; [`recv`](Self::recv) then returns `None`.
pub struct WatchSubscription {
    id: Uuid,
    path: String,
    scope: Scope,
    full_path: PathBuf,
    watcher: Mutex<Option<RecommendedWatcher>>,
    events: mpsc::UnboundedReceiver<WatchEvent>,
}

impl std::fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("scope", &self.scope)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl WatchSubscription {
    /// Arm a non-recursive watch on `full_path`.
    pub(crate) fn arm(
        full_path: PathBuf,
        path: String,
        scope: Scope,
        bus: EventBus,
    ) -> VfsResult<Self> {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let logical = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => forward(&event, id, &logical, scope, &tx, &bus),
                Err(e) => warn!(watch_id = %id, error = %e, "Filesystem watcher error"),
            },
            notify::Config::default(),
        )?;
        watcher.watch(&full_path, RecursiveMode::NonRecursive)?;

        debug!(watch_id = %id, scope = %scope, path = %path, "Watch armed");

        Ok(Self {
            id,
            path,
            scope,
            full_path,
            watcher: Mutex::new(Some(watcher)),
            events: rx,
        })
    }

    /// Subscription id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Logical path being watched.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Scope of the watched path.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Resolved absolute path being watched.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Wait for the next change. Returns `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Take a buffered change without waiting.
    pub fn try_recv(&mut self) -> Option<WatchEvent> {
        self.events.try_recv().ok()
    }

    /// Release the OS watch. Idempotent; returns `true` only for the call
    /// that actually closed it.
    pub fn close(&self) -> bool {
        let taken = match self.watcher.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let closed = taken.is_some();
        // Dropping the watcher drops the callback and with it the channel sender.
        drop(taken);
        if closed {
            debug!(watch_id = %self.id, path = %self.path, "Watch closed");
        }
        closed
    }

    /// Whether the subscription has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self.watcher.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

fn forward(
    event: &Event,
    watch_id: Uuid,
    path: &str,
    scope: Scope,
    tx: &mpsc::UnboundedSender<WatchEvent>,
    bus: &EventBus,
) {
    let Some(kind) = ChangeKind::from_native(&event.kind) else {
        return;
    };
    let filename = event
        .paths
        .first()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let metadata = EventMetadata::new("watch");
    let change = WatchEvent {
        kind,
        filename: filename.clone(),
        path: path.to_string(),
        scope,
        timestamp: metadata.timestamp,
    };

    // Receiver gone means the owner is tearing down; the bus still hears about it.
    let _ = tx.send(change);
    bus.publish(VfsEvent::FileChange {
        metadata,
        path: path.to_string(),
        scope,
        kind,
        filename,
        watch_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RenameMode};

    #[test]
    fn test_change_kind_mapping() {
        assert_eq!(
            ChangeKind::from_native(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_native(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            ChangeKind::from_native(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(
            ChangeKind::from_native(&EventKind::Access(AccessKind::Any)),
            None
        );
    }

    #[test]
    fn test_forward_reaches_channel_and_bus() {
        let bus = EventBus::new();
        let mut bus_rx = bus.subscribe();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/eco/global/logs/new.txt"));
        forward(&event, id, "logs", Scope::Global, &tx, &bus);

        let change = rx.try_recv().unwrap();
        assert_eq!(change.kind, ChangeKind::Created);
        assert_eq!(change.filename.as_deref(), Some("new.txt"));
        assert_eq!(change.path, "logs");

        let published = bus_rx.try_recv().unwrap();
        assert_eq!(published.event_type(), "file:change");
        assert!(matches!(
            &*published,
            VfsEvent::FileChange { watch_id, .. } if *watch_id == id
        ));
    }
}
