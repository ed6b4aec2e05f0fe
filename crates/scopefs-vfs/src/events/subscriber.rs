//! Synchronous event subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::events::VfsEvent;

/// Callback notified synchronously for every published event.
///
/// Runs on the publishing task (or the OS watcher thread for `file:change`),
/// so implementations must return quickly.
pub trait EventSubscriber: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &VfsEvent);
}

impl<F> EventSubscriber for F
where
    F: Fn(&VfsEvent) + Send + Sync,
{
    fn on_event(&self, event: &VfsEvent) {
        self(event);
    }
}

/// Handle returned by [`SubscriberRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Registry of synchronous subscribers.
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, Arc<dyn EventSubscriber>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SubscriberRegistry {
    /// Registry with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Add `subscriber`; the returned id removes it again.
    pub fn register(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.subscribers.write() {
            Ok(mut subs) => {
                subs.insert(id, subscriber);
            },
            Err(poisoned) => {
                poisoned.into_inner().insert(id, subscriber);
            },
        }
        id
    }

    /// Remove a subscriber. Returns `true` if it was registered.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = match self.subscribers.write() {
            Ok(mut subs) => subs.remove(&id),
            Err(poisoned) => poisoned.into_inner().remove(&id),
        };
        removed.is_some()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().map_or(0, |subs| subs.len())
    }

    /// Whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every subscriber of `event`.
    pub(crate) fn notify(&self, event: &VfsEvent) {
        // Snapshot so callbacks may register/unregister without deadlocking.
        let snapshot: Vec<Arc<dyn EventSubscriber>> = match self.subscribers.read() {
            Ok(subs) => subs.values().cloned().collect(),
            Err(_) => {
                warn!("Subscriber registry lock poisoned, skipping notification");
                return;
            },
        };

        for subscriber in snapshot {
            subscriber.on_event(event);
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
