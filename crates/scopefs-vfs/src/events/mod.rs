//! Change notification for the scoped VFS.
//!
//! File operations publish [`VfsEvent`]s on an [`EventBus`] owned by the
//! VFS instance. Consumers either poll an [`EventReceiver`] or register an
//! [`EventSubscriber`] callback. Native watch notifications are bridged onto
//! the same bus as `file:change` events.

mod bus;
mod event;
mod subscriber;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};
pub use event::{EventMetadata, VfsEvent};
pub use subscriber::{EventSubscriber, SubscriberId, SubscriberRegistry};
