//! Process-wide "registry changed" notifier.
//!
//! Handlers take no arguments: a notification means "something changed, re-read
//! if you care". Delivery is synchronous, in subscription order, at most once,
//! and only to handlers registered before the publish.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Handler)>>,
}

impl Inner {
    fn handlers(&self) -> MutexGuard<'_, Vec<(u64, Handler)>> {
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_registered(&self, id: u64) -> bool { self.handlers().iter().any(|(hid, _)| *hid == id) }

    fn remove(&self, id: u64) {
        let mut hs = self.handlers();
        hs.retain(|(hid, _)| *hid != id);
        metrics::gauge!("notify_subscribers", hs.len() as f64);
        debug!(id, subscribers = hs.len(), "unsubscribed");
    }
}

/// Cheaply cloneable handle to one notification topic.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    pub fn new() -> Self { Self::default() }

    /// Register `handler`. It stays registered until the returned guard is
    /// unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut hs = self.inner.handlers();
        hs.push((id, Arc::new(handler)));
        metrics::gauge!("notify_subscribers", hs.len() as f64);
        debug!(id, subscribers = hs.len(), "subscribed");
        Subscription { id, inner: Arc::downgrade(&self.inner) }
    }

    /// Invoke every currently registered handler.
    ///
    /// The handler list is copied before delivery, so handlers may subscribe or
    /// unsubscribe from within a callback. Each handler is re-checked right before
    /// its call: one removed earlier in the same round is skipped. A removal racing
    /// on another thread can still see the single call already past that check.
    /// A panicking handler is logged and skipped.
    pub fn publish(&self) {
        let targets: Vec<(u64, Handler)> = self.inner.handlers().clone();
        for (id, h) in targets {
            if !self.inner.is_registered(id) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| h())).is_err() {
                warn!(id, "notification handler panicked; continuing delivery");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize { self.inner.handlers().len() }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("subscribers", &self.subscriber_count()).finish()
    }
}

/// Registration guard returned by [`Notifier::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    /// Deregister now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove(self.id);
        }
    }
}
