#![forbid(unsafe_code)]

//! In-process publish/subscribe for "stored progress changed" signals.
//!
//! Delivery is synchronous: `publish` runs every live handler for the topic on the caller's
//! stack, in subscription order, before returning. A handler that is not subscribed when the
//! signal fires never sees it; views re-read the store when they open, so nothing is replayed.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Topic(&'static str);

impl Topic {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Fired after every successful progress write.
pub const PROGRESS_TOPIC: Topic = Topic::new("progress");

type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

struct Subscriber {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Arc<Mutex<BusInner>>,
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ChangeBus")
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `topic` until the returned guard is dropped.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push(Subscriber {
            id,
            topic,
            handler: Arc::new(handler),
        });
        debug!(topic = topic.as_str(), id, "change bus subscribe");
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
            topic,
        }
    }

    /// Delivers `topic` to every live subscriber and returns how many were called.
    pub fn publish(&self, topic: Topic) -> usize {
        // Handlers run without the lock held so they may publish or subscribe themselves.
        let handlers: Vec<Handler> = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner
                .subscribers
                .iter()
                .filter(|s| s.topic == topic)
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };
        for handler in &handlers {
            handler(topic);
        }
        if handlers.is_empty() {
            debug!(topic = topic.as_str(), "change signal dropped (no subscribers)");
        } else {
            debug!(
                topic = topic.as_str(),
                receivers = handlers.len(),
                "change signal delivered"
            );
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.iter().filter(|s| s.topic == topic).count()
    }
}

/// Live registration on a [`ChangeBus`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    id: u64,
    topic: Topic,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let mut inner = bus.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.retain(|s| s.id != self.id);
        debug!(topic = self.topic.as_str(), id = self.id, "change bus unsubscribe");
    }
}
