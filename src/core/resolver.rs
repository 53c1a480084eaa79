//! Per-item stat resolution.
//!
//! The resolver is fire-and-forget: callers never get a return value and
//! never see an error. Results surface exclusively through cache
//! subscriptions, and every per-item failure — transport error, rejected
//! search, no match — degrades to the same terminal all-unknown bundle.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, StatCache};
use crate::adapters::LookupCapability;
use crate::domain::{LibraryItem, StatBundle};

/// Resolves completion-time stats for library items, one lookup per key.
pub struct StatResolver {
    cache: Arc<StatCache>,
    lookup: Arc<dyn LookupCapability>,
}

impl StatResolver {
    pub fn new(cache: Arc<StatCache>, lookup: Arc<dyn LookupCapability>) -> Self {
        Self { cache, lookup }
    }

    /// The cache this resolver writes through.
    pub fn cache(&self) -> &Arc<StatCache> {
        &self.cache
    }

    /// Kick off resolution for one item.
    ///
    /// Returns immediately. If a lookup for this key is already in flight
    /// or resolved, nothing is spawned — existing subscribers cover it.
    /// Otherwise a task runs the external lookup and completes the cache
    /// key; interested parties observe the result via
    /// [`StatCache::subscribe`].
    #[instrument(skip(self, item), fields(id = item.id, name = %item.name))]
    pub fn resolve(&self, item: &LibraryItem) {
        let key = CacheKey::for_item(item);

        if !self.cache.begin_fetch(&key) {
            debug!("lookup already in flight or resolved");
            return;
        }

        let cache = Arc::clone(&self.cache);
        let lookup = Arc::clone(&self.lookup);
        let id = item.id;
        let name = item.name.clone();

        tokio::spawn(async move {
            let bundle = match lookup.find_match(id, &name).await {
                Ok(Some(record)) => {
                    debug!(id, name = %name, "match found");
                    StatBundle::from_record(&record)
                }
                Ok(None) => {
                    debug!(id, name = %name, "no match at the reference source");
                    StatBundle::no_match()
                }
                Err(e) => {
                    // Indistinguishable from no-match downstream; the log
                    // line is the only difference.
                    warn!(id, name = %name, error = %e, "lookup failed");
                    StatBundle::no_match()
                }
            };

            cache.complete(&key, bundle);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{HourValue, MatchRecord};

    /// Counts calls; answers every lookup with a fixed 10-hour record.
    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl CountingLookup {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LookupCapability for CountingLookup {
        async fn find_match(&self, _id: u32, _name: &str) -> Result<Option<MatchRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(MatchRecord {
                main: "10 Hours".to_string(),
                main_plus: "--".to_string(),
                completionist: "--".to_string(),
                all_styles: "--".to_string(),
                record_id: None,
            }))
        }
    }

    #[tokio::test]
    async fn test_resolve_completes_the_key() {
        let cache = Arc::new(StatCache::new());
        let lookup = Arc::new(CountingLookup::new());
        let resolver = StatResolver::new(Arc::clone(&cache), lookup);

        let item = LibraryItem::new(400, "Portal");
        let rx = cache.subscribe(&CacheKey::for_item(&item));
        resolver.resolve(&item);

        let bundle = rx.await.unwrap();
        assert_eq!(bundle.main, HourValue::Known(10.0));
    }

    #[tokio::test]
    async fn test_duplicate_resolve_single_lookup() {
        let cache = Arc::new(StatCache::new());
        let lookup = Arc::new(CountingLookup::new());
        let resolver =
            StatResolver::new(Arc::clone(&cache), Arc::clone(&lookup) as Arc<dyn LookupCapability>);

        let item = LibraryItem::new(400, "Portal");
        let rx = cache.subscribe(&CacheKey::for_item(&item));

        resolver.resolve(&item);
        resolver.resolve(&item);
        rx.await.unwrap();
        resolver.resolve(&item);

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }
}
