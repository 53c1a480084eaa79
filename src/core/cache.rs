//! Process-wide stat cache with fetch deduplication.
//!
//! The cache is the serialization point for the whole engine: `begin_fetch`
//! is the only gate between "nobody is looking this up" and "a lookup is in
//! flight", so at most one outstanding lookup exists per key. Subscribers
//! register oneshot waiters that are drained exactly once when the key
//! resolves; subscribing to an already-resolved key fulfills the waiter
//! before `subscribe` returns, so there is no window in which a
//! notification can be missed.
//!
//! The cache is injectable state, not a module-level singleton: construct
//! one per engine (or per test) and share it via `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::debug;

use crate::domain::{LibraryItem, StatBundle};

/// Cache key: item identity plus normalized display name.
///
/// The external lookup is name-based, so the id alone cannot disambiguate;
/// two entries with the same id but different names are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: u32,
    pub name: String,
}

impl CacheKey {
    /// Build the key for a library item, normalizing the name.
    pub fn for_item(item: &LibraryItem) -> Self {
        Self {
            id: item.id,
            name: item.name.trim().to_lowercase(),
        }
    }
}

/// Per-key lifecycle: created on first request, in-flight while a lookup
/// runs, resolved forever after. Never evicted during a session.
enum EntryState {
    /// Known key, no lookup started yet (subscribers may arrive first).
    Idle,
    /// A lookup is in flight.
    InFlight,
    /// Terminal: the bundle for this key.
    Resolved(Arc<StatBundle>),
}

struct CacheEntry {
    state: EntryState,
    /// Waiters to notify when the key resolves.
    waiters: Vec<oneshot::Sender<Arc<StatBundle>>>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            state: EntryState::Idle,
            waiters: Vec::new(),
        }
    }
}

/// Keyed store of resolved stat bundles.
pub struct StatCache {
    // One mutex over the whole map; every mutation is a short critical
    // section and the lock is never held across an await point.
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl Default for StatCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The resolved bundle for a key, if resolution has finished.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<StatBundle>> {
        let entries = self.entries.lock().expect("stat cache poisoned");
        match entries.get(key) {
            Some(CacheEntry {
                state: EntryState::Resolved(bundle),
                ..
            }) => Some(Arc::clone(bundle)),
            _ => None,
        }
    }

    /// Atomically claim the fetch for a key.
    ///
    /// Returns true iff this call transitioned the key to in-flight; on
    /// false the caller must not start a lookup (one is already running
    /// or the key is resolved).
    pub fn begin_fetch(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.lock().expect("stat cache poisoned");
        let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

        match entry.state {
            EntryState::Idle => {
                entry.state = EntryState::InFlight;
                true
            }
            EntryState::InFlight | EntryState::Resolved(_) => false,
        }
    }

    /// Record the resolved bundle and notify every waiter exactly once.
    ///
    /// Idempotent in effect: completing an already-resolved key replaces
    /// the bundle (fresh reload semantics) and notifies any waiters that
    /// registered since.
    pub fn complete(&self, key: &CacheKey, bundle: StatBundle) {
        let bundle = Arc::new(bundle);

        let waiters = {
            let mut entries = self.entries.lock().expect("stat cache poisoned");
            let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

            if matches!(entry.state, EntryState::Resolved(_)) {
                debug!(id = key.id, name = %key.name, "re-resolving cached key");
            }
            entry.state = EntryState::Resolved(Arc::clone(&bundle));
            std::mem::take(&mut entry.waiters)
        };

        for waiter in waiters {
            // A dropped receiver means the subscriber went away; that is
            // the cancellation path, not an error.
            let _ = waiter.send(Arc::clone(&bundle));
        }
    }

    /// Register interest in a key.
    ///
    /// The returned receiver yields the bundle when `complete` runs. For a
    /// key that is already resolved the value is sent before this method
    /// returns, so the receiver is immediately ready. Dropping the
    /// receiver unregisters the subscription.
    pub fn subscribe(&self, key: &CacheKey) -> oneshot::Receiver<Arc<StatBundle>> {
        let (tx, rx) = oneshot::channel();

        let mut entries = self.entries.lock().expect("stat cache poisoned");
        let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

        match &entry.state {
            EntryState::Resolved(bundle) => {
                let _ = tx.send(Arc::clone(bundle));
            }
            EntryState::Idle | EntryState::InFlight => {
                entry.waiters.push(tx);
            }
        }

        rx
    }

    /// Number of keys the cache has seen (any state).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("stat cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
