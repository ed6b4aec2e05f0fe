//! Per-VFS fan-out of file events.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, trace, warn};

use crate::events::{SubscriberRegistry, VfsEvent};

/// Broadcast buffer size used when none is configured.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Event bus owned by one [`ScopedVfs`](crate::ScopedVfs).
///
/// Async receivers get every event through a broadcast channel; synchronous
/// subscribers in the [`SubscriberRegistry`] are called inline. Clones share
/// the same channel and registry.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Arc<VfsEvent>>,
    sync_subscribers: Arc<SubscriberRegistry>,
    capacity: usize,
}

impl EventBus {
    /// Bus with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering up to `capacity` events per slow receiver. Zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            tx: broadcast::channel(capacity).0,
            sync_subscribers: Arc::new(SubscriberRegistry::new()),
            capacity,
        }
    }

    /// Deliver `event` to every receiver and synchronous subscriber.
    ///
    /// Returns how many async receivers were live at send time.
    pub fn publish(&self, event: VfsEvent) -> usize {
        let event = Arc::new(event);

        let delivered = self.tx.send(Arc::clone(&event)).unwrap_or(0);
        if delivered == 0 {
            trace!(event_type = event.event_type(), path = event.path(), "No async receivers");
        } else {
            debug!(
                event_type = event.event_type(),
                scope = %event.scope(),
                path = event.path(),
                receivers = delivered,
                "Published"
            );
        }

        // Inline callbacks run after the broadcast so receivers are never held up by them.
        self.sync_subscribers.notify(&event);
        delivered
    }

    /// Receiver for every event.
    #[must_use]
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            rx: self.tx.subscribe(),
            filter: TypeFilter::All,
        }
    }

    /// Receiver for events whose type matches `pattern`: either an exact
    /// type (`file:delete`) or a prefix ending in `*` (`file:*`).
    #[must_use]
    pub fn subscribe_type(&self, pattern: impl Into<String>) -> EventReceiver {
        EventReceiver {
            rx: self.tx.subscribe(),
            filter: TypeFilter::parse(pattern.into()),
        }
    }

    /// Synchronous subscribers called on every publish.
    #[must_use]
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.sync_subscribers
    }

    /// Live async receivers plus registered synchronous subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx
            .receiver_count()
            .saturating_add(self.sync_subscribers.len())
    }

    /// Broadcast buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
enum TypeFilter {
    All,
    Exact(String),
    Prefix(String),
}

impl TypeFilter {
    fn parse(pattern: String) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(pattern),
        }
    }

    fn accepts(&self, event_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(t) => event_type == t,
            Self::Prefix(p) => event_type.starts_with(p.as_str()),
        }
    }
}

/// Async handle on an [`EventBus`], optionally filtered by event type.
#[derive(Debug)]
pub struct EventReceiver {
    rx: broadcast::Receiver<Arc<VfsEvent>>,
    filter: TypeFilter,
}

impl EventReceiver {
    /// Wait for the next accepted event. `None` once every bus clone is gone.
    ///
    /// Events lost to lag are logged and skipped.
    pub async fn recv(&mut self) -> Option<Arc<VfsEvent>> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.filter.accepts(event.event_type()) => return Some(event),
                Ok(_) => {},
                Err(RecvError::Lagged(missed)) => lagged(missed),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next accepted event already buffered, without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<VfsEvent>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.filter.accepts(event.event_type()) => return Some(event),
                Ok(_) => {},
                Err(TryRecvError::Lagged(missed)) => lagged(missed),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

fn lagged(missed: u64) {
    warn!(missed, "Event receiver fell behind; events dropped");
}
