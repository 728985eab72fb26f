//! Update broadcaster for fanning out committed spot changes
//!
//! Two delivery paths share one publish call:
//! - synchronous callbacks, invoked in subscription order;
//! - an async feed (tokio broadcast channel) for remote observers.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::SpotsUpdated;

/// Default feed channel capacity
const DEFAULT_CAPACITY: usize = 1024;

type Callback = Arc<dyn Fn(&SpotsUpdated) + Send + Sync>;

struct Inner {
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_subscriber_id: AtomicU64,
    sender: broadcast::Sender<SpotsUpdated>,
    feed_count: Arc<AtomicUsize>,
}

/// Broadcasts every committed collection change to all observers.
#[derive(Clone)]
pub struct UpdateBroadcaster {
    inner: Arc<Inner>,
}

impl UpdateBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a broadcaster whose async feed buffers `capacity` messages
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
                sender,
                feed_count: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    /// Register a callback; it stays registered until the returned
    /// handle's [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SpotsUpdated) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let total = {
            let mut subscribers = self.lock_subscribers();
            subscribers.push((id, Arc::new(callback)));
            subscribers.len()
        };
        debug!(subscriber_id = id, total, "Update subscriber registered");

        Subscription {
            id,
            broadcaster: Arc::downgrade(&self.inner),
            active: AtomicBool::new(true),
        }
    }

    /// Deliver an update to every callback, then to the async feed.
    ///
    /// A panicking callback is logged and skipped; later callbacks still
    /// receive the update. Returns the number of callbacks that completed.
    pub fn publish(&self, update: SpotsUpdated) -> usize {
        // Run callbacks outside the lock so they may unsubscribe themselves
        let callbacks: Vec<(u64, Callback)> = self.lock_subscribers().clone();

        let mut delivered = 0;
        for (id, callback) in &callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(&update))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(
                    subscriber_id = id,
                    sequence = update.sequence,
                    "Update subscriber panicked, continuing delivery"
                ),
            }
        }

        let event_type = update.change.event_type();
        let sequence = update.sequence;
        match self.inner.sender.send(update) {
            Ok(feeds) => debug!(event_type, sequence, callbacks = delivered, feeds, "Update published"),
            Err(_) => debug!(event_type, sequence, callbacks = delivered, "Update published (no feeds)"),
        }

        delivered
    }

    /// Open an async feed of updates published from now on.
    pub fn feed(&self) -> UpdateFeed {
        let receiver = self.inner.sender.subscribe();
        let count = self.inner.feed_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(total = count, "New update feed subscriber");

        UpdateFeed {
            receiver,
            feed_count: self.inner.feed_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    pub fn feed_count(&self) -> usize {
        self.inner.feed_count.load(Ordering::SeqCst)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Callback)>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UpdateBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`UpdateBroadcaster::subscribe`].
///
/// Dropping the handle leaves the callback registered.
pub struct Subscription {
    id: u64,
    broadcaster: Weak<Inner>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = self.broadcaster.upgrade() {
            let mut subscribers = inner
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.retain(|(id, _)| *id != self.id);
            debug!(subscriber_id = self.id, remaining = subscribers.len(), "Update subscriber removed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Async receiver of published updates
pub struct UpdateFeed {
    receiver: broadcast::Receiver<SpotsUpdated>,
    feed_count: Arc<AtomicUsize>,
}

impl UpdateFeed {
    /// Receive the next update. `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<SpotsUpdated> {
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(missed = count, "Update feed lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return None;
                }
            }
        }
    }
}

impl Drop for UpdateFeed {
    fn drop(&mut self) {
        let prev = self.feed_count.fetch_sub(1, Ordering::SeqCst);
        info!(remaining = prev - 1, "Update feed subscriber disconnected");
    }
}
