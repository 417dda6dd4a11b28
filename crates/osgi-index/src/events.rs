//! Project-wide bundle change notifications.

use std::sync::{Arc, Mutex, PoisonError};

/// Notification published by the bundle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleEvent {
    /// A reindex changed the bundle index.
    BundlesChanged,
    /// A hand-edited manifest changed and the configured strategy asks
    /// for dependencies to be synchronized now.
    ResyncRequested,
}

/// Receives [`BundleEvent`]s.
pub trait BundleListener: Send + Sync {
    fn on_event(&self, event: BundleEvent);
}

impl<F> BundleListener for F
where
    F: Fn(BundleEvent) + Send + Sync,
{
    fn on_event(&self, event: BundleEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Arc<dyn BundleListener>)>,
}

/// Synchronous fan-out of bundle events to subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Subscribers>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl BundleListener + 'static) -> SubscriptionId {
        let mut subscribers = self.lock();
        subscribers.next_id += 1;
        let id = SubscriptionId(subscribers.next_id);
        subscribers.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.listeners.len();
        subscribers.listeners.retain(|(sid, _)| *sid != id);
        subscribers.listeners.len() != before
    }

    /// Deliver `event` to every subscriber in subscription order.
    ///
    /// Listeners run outside the lock, so they may subscribe or
    /// unsubscribe; such changes apply from the next event on.
    pub fn publish(&self, event: BundleEvent) {
        let listeners: Vec<Arc<dyn BundleListener>> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::debug!(?event, listeners = listeners.len(), "publishing bundle event");
        for listener in listeners {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
