// src/events.rs
//
// Minimal topic-based event bus for progress/metrics observers.
//
// Handed to the bucket lister at construction instead of living as a
// process-wide registry, so listing stays independently testable. Delivery
// is synchronous on the publishing thread; handlers must not block.

use log::trace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Topic published once per retrieved list-objects page, carrying the raw
/// page payload.
pub const AFTER_CALL_LIST_OBJECTS: &str = "after-call.s3.ListObjects";

pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Token identifying one subscription, returned by
/// [`EventBus::subscribe`] and consumed by [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Topic → handler registry, generic over the payload type.
pub struct EventBus<P> {
    handlers: Mutex<HashMap<String, Vec<(SubscriberId, Handler<P>)>>>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `handler` for `topic`. Handlers for one topic fire in
    /// subscription order.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> SubscriberId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.handlers)
            .entry(topic.to_owned())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, topic: &str, id: SubscriberId) -> bool {
        let mut handlers = lock(&self.handlers);
        let Some(subs) = handlers.get_mut(topic) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        let removed = subs.len() < before;
        if subs.is_empty() {
            handlers.remove(topic);
        }
        removed
    }

    /// Deliver `payload` to every handler registered for `topic`,
    /// synchronously, in subscription order.
    pub fn publish(&self, topic: &str, payload: &P) {
        // Snapshot outside the lock so a handler may (un)subscribe while
        // running without deadlocking.
        let snapshot: Vec<Handler<P>> = match lock(&self.handlers).get(topic) {
            Some(subs) => subs.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };
        trace!("publish {topic} to {} handler(s)", snapshot.len());
        for handler in snapshot {
            handler(payload);
        }
    }

    /// Register `handler` for the lifetime of the returned guard. The
    /// subscription is released when the guard drops, on every exit path
    /// including unwinding.
    pub fn subscribe_scoped<F>(&self, topic: &str, handler: F) -> ScopedSubscription<'_, P>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = self.subscribe(topic, handler);
        ScopedSubscription {
            bus: self,
            topic: topic.to_owned(),
            id,
        }
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one subscription; see [`EventBus::subscribe_scoped`].
pub struct ScopedSubscription<'a, P> {
    bus: &'a EventBus<P>,
    topic: String,
    id: SubscriberId,
}

impl<P> Drop for ScopedSubscription<'_, P> {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.topic, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn publish_reaches_only_matching_topic() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen2 = Arc::clone(&seen);
        bus.subscribe("a", move |v| {
            seen2.fetch_add(*v as usize, Ordering::SeqCst);
        });

        bus.publish("a", &3);
        bus.publish("b", &100);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus: EventBus<()> = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen2 = Arc::clone(&seen);
        let id = bus.subscribe("t", move |_| {
            seen2.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish("t", &());
        assert!(bus.unsubscribe("t", id));
        assert!(!bus.unsubscribe("t", id));
        bus.publish("t", &());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_may_subscribe_during_publish() {
        let bus: Arc<EventBus<()>> = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let bus2 = Arc::clone(&bus);
        let seen2 = Arc::clone(&seen);
        bus.subscribe("t", move |_| {
            let seen3 = Arc::clone(&seen2);
            bus2.subscribe("t", move |_| {
                seen3.fetch_add(1, Ordering::SeqCst);
            });
        });

        // First publish adds a second handler; only the second publish
        // reaches it.
        bus.publish("t", &());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        bus.publish("t", &());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
