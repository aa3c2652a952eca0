use lovebot_types::prelude::SenderId;
use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Outcome of recording one request against a sender's window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Requests seen from this sender within the window, denied ones
    /// included. Drives the escalation decision only.
    pub observed: usize,
}

#[derive(Default)]
struct SenderWindow {
    /// Timestamps of admitted requests; the admission decision counts these.
    admitted: Vec<Instant>,
    /// Timestamps of every request, admitted or denied. Denied requests must
    /// not delay future admissions, but they do count toward escalation.
    observed: Vec<Instant>,
}

/// Per-sender sliding-window request ledger. Bounded: the least recently
/// seen sender is evicted once `capacity` senders are tracked.
pub struct RequestLedger {
    entries: Mutex<LruCache<SenderId, SenderWindow>>,
}

impl RequestLedger {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Prune the sender's window to `[now - window, now]`, decide admission
    /// against `limit`, and record the request, all in one step under the
    /// ledger lock.
    pub fn admit(
        &self,
        sender: SenderId,
        now: Instant,
        window: Duration,
        limit: usize,
    ) -> Admission {
        let mut entries = self.entries.lock();
        let entry = entries.get_or_insert_mut(sender, SenderWindow::default);

        entry.admitted.retain(|&ts| now.duration_since(ts) < window);
        entry.observed.retain(|&ts| now.duration_since(ts) < window);
        entry.observed.push(now);

        if entry.admitted.len() >= limit {
            Admission {
                allowed: false,
                observed: entry.observed.len(),
            }
        } else {
            entry.admitted.push(now);
            Admission {
                allowed: true,
                observed: entry.observed.len(),
            }
        }
    }

    /// Whether the ledger currently tracks this sender. Does not touch
    /// recency order.
    pub fn is_tracked(&self, sender: SenderId) -> bool {
        self.entries.lock().peek(&sender).is_some()
    }

    pub fn tracked_senders(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Last-alert ledger: remembers when an alert was last sent per key and
/// refuses a new one inside the cooldown. Keys are sender identities for
/// spam alerts and error fingerprints for fault alerts.
pub struct AlertThrottleLedger<K: Hash + Eq> {
    entries: Mutex<LruCache<K, Instant>>,
}

impl<K: Hash + Eq> AlertThrottleLedger<K> {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Reserve an alert slot for `key`. Returns false inside the cooldown.
    /// The reservation is taken before the send so concurrent tasks cannot
    /// both pass the check.
    pub fn try_begin(&self, key: K, now: Instant, cooldown: Duration) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(&last) if now.duration_since(last) < cooldown => false,
            _ => {
                entries.put(key, now);
                true
            }
        }
    }
}
