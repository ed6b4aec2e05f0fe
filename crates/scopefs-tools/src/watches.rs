//! Watches kept alive by the registry on behalf of callers.

use std::collections::HashMap;
use std::sync::Mutex;

use scopefs_vfs::{Scope, WatchSubscription};
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

struct ActiveWatch {
    path: String,
    scope: Scope,
    task: JoinHandle<()>,
}

/// Live watch subscriptions keyed by watch id.
///
/// Each subscription is owned by a drain task; changes still reach the
/// event bus as `file:change`. Aborting the task drops the subscription,
/// which releases the OS watch.
#[derive(Default)]
pub struct WatchTable {
    active: Mutex<HashMap<Uuid, ActiveWatch>>,
}

impl std::fmt::Debug for WatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTable")
            .field("active", &self.len())
            .finish()
    }
}

impl WatchTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_active<R>(&self, f: impl FnOnce(&mut HashMap<Uuid, ActiveWatch>) -> R) -> R {
        match self.active.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Take ownership of `subscription`. Must be called inside a tokio runtime.
    pub fn insert(&self, mut subscription: WatchSubscription) -> Uuid {
        let id = subscription.id();
        let path = subscription.path().to_string();
        let scope = subscription.scope();

        let task = tokio::spawn(async move {
            while let Some(change) = subscription.recv().await {
                trace!(watch_id = %id, kind = ?change.kind, filename = ?change.filename, "Watch change");
            }
        });

        self.with_active(|active| {
            active.insert(id, ActiveWatch { path, scope, task });
        });
        id
    }

    /// Close the watch with `id`. Returns `false` if it was not active.
    pub fn close(&self, id: Uuid) -> bool {
        let Some(watch) = self.with_active(|active| active.remove(&id)) else {
            return false;
        };
        watch.task.abort();
        debug!(watch_id = %id, scope = %watch.scope, path = %watch.path, "Watch released");
        true
    }

    /// Close every active watch. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.with_active(|active| active.drain().collect());
        for (_, watch) in &drained {
            watch.task.abort();
        }
        drained.len()
    }

    /// Ids of every active watch.
    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.with_active(|active| active.keys().copied().collect())
    }

    /// Number of active watches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_active(|active| active.len())
    }

    /// Whether no watch is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for WatchTable {
    fn drop(&mut self) {
        self.close_all();
    }
}
