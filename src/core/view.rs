//! Live aggregation of library items and their resolved estimates.
//!
//! The view holds the arrival-ordered library and a per-item estimate map
//! that fills in as lookups land. Each item's update is an independent map
//! insert keyed by identity, so the order in which different items resolve
//! can never corrupt another item's state. The displayed order is always
//! re-derived from scratch via [`order`]; nothing is patched in place.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use super::cache::CacheKey;
use super::resolver::StatResolver;
use super::sort::{order, SortMode};
use crate::domain::{LibraryItem, SortableItem};

/// One item's resolution outcome, as delivered to the view.
#[derive(Debug, Clone)]
pub struct StatUpdate {
    /// Which item resolved.
    pub id: u32,

    /// Main-story hours; `None` when the bundle resolved without a known
    /// main-story value.
    pub main_hours: Option<f64>,
}

/// Aggregated library state feeding the sort engine.
///
/// Dropping the view drops its update receiver: forwarder tasks for
/// still-pending lookups fail their send and exit, so a late result can
/// never write into a torn-down view.
pub struct LibraryView {
    /// Items in arrival order. Immutable for the session once loaded.
    items: Vec<LibraryItem>,

    /// Known main-story estimates by item id. Absent until resolved with
    /// a known value.
    estimates: HashMap<u32, f64>,

    /// Items whose resolution has not yet been observed.
    outstanding: usize,

    updates_tx: mpsc::UnboundedSender<StatUpdate>,
    updates_rx: mpsc::UnboundedReceiver<StatUpdate>,
}

impl LibraryView {
    /// Create an empty view.
    pub fn new() -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            items: Vec::new(),
            estimates: HashMap::new(),
            outstanding: 0,
            updates_tx,
            updates_rx,
        }
    }

    /// Load the library and kick off resolution for every item.
    ///
    /// Returns as soon as all lookups are started; nothing here waits on
    /// the network, so the initial render is never blocked. Results are
    /// observed via [`LibraryView::next_update`] / [`LibraryView::drain_updates`].
    pub fn load(&mut self, items: Vec<LibraryItem>, resolver: &StatResolver) {
        for item in items {
            self.attach(item, resolver);
        }
    }

    /// Add one item: register it unresolved, start its lookup, and wire a
    /// forwarder from its cache subscription into the update channel.
    fn attach(&mut self, item: LibraryItem, resolver: &StatResolver) {
        let key = CacheKey::for_item(&item);

        // Subscribe before resolving so an instantly-completing lookup
        // cannot slip between the two.
        let subscription = resolver.cache().subscribe(&key);
        resolver.resolve(&item);

        let id = item.id;
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            // Err on either side means cancellation: the cache entry was
            // dropped or the view went away. Both are silent exits.
            if let Ok(bundle) = subscription.await {
                let _ = tx.send(StatUpdate {
                    id,
                    main_hours: bundle.main.hours(),
                });
            }
        });

        self.items.push(item);
        self.outstanding += 1;
    }

    /// Apply one update to this item's slice of state.
    fn apply(&mut self, update: StatUpdate) {
        if let Some(hours) = update.main_hours {
            self.estimates.insert(update.id, hours);
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        debug!(
            id = update.id,
            outstanding = self.outstanding,
            "estimate updated"
        );
    }

    /// Wait for the next item to resolve and fold it in.
    ///
    /// Returns the update, or `None` once every item has been observed.
    pub async fn next_update(&mut self) -> Option<StatUpdate> {
        if self.outstanding == 0 {
            return None;
        }
        // The view holds a sender clone, so recv cannot return None while
        // updates are outstanding.
        let update = self.updates_rx.recv().await?;
        self.apply(update.clone());
        Some(update)
    }

    /// Fold in every update that has already arrived, without waiting.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    /// True once every loaded item's resolution has been observed.
    pub fn is_settled(&self) -> bool {
        self.outstanding == 0
    }

    /// Number of loaded items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in arrival order.
    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    /// The known estimate for an item, if resolved.
    pub fn estimate(&self, id: u32) -> Option<f64> {
        self.estimates.get(&id).copied()
    }

    /// Derive the current display order.
    pub fn sorted(&self, mode: SortMode) -> Vec<SortableItem> {
        let sortable: Vec<SortableItem> = self
            .items
            .iter()
            .map(|item| SortableItem::new(item.clone(), self.estimate(item.id)))
            .collect();
        order(&sortable, mode)
    }
}

impl Default for LibraryView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::adapters::LookupCapability;
    use crate::core::cache::StatCache;
    use crate::domain::MatchRecord;

    /// Answers with `<id> Hours` so tests can tell items apart, except for
    /// ids listed as misses.
    struct IdHoursLookup {
        misses: Vec<u32>,
    }

    #[async_trait]
    impl LookupCapability for IdHoursLookup {
        async fn find_match(&self, id: u32, _name: &str) -> Result<Option<MatchRecord>> {
            if self.misses.contains(&id) {
                return Ok(None);
            }
            Ok(Some(MatchRecord {
                main: format!("{} Hours", id),
                main_plus: "--".to_string(),
                completionist: "--".to_string(),
                all_styles: "--".to_string(),
                record_id: None,
            }))
        }
    }

    fn engine(misses: Vec<u32>) -> StatResolver {
        StatResolver::new(
            Arc::new(StatCache::new()),
            Arc::new(IdHoursLookup { misses }),
        )
    }

    #[tokio::test]
    async fn test_load_starts_unresolved() {
        let resolver = engine(vec![]);
        let mut view = LibraryView::new();

        view.load(
            vec![LibraryItem::new(3, "Three"), LibraryItem::new(7, "Seven")],
            &resolver,
        );

        assert_eq!(view.len(), 2);
        assert!(!view.is_settled());
        assert_eq!(view.estimate(3), None);
    }

    #[tokio::test]
    async fn test_updates_fill_estimates_per_item() {
        let resolver = engine(vec![]);
        let mut view = LibraryView::new();

        view.load(
            vec![LibraryItem::new(3, "Three"), LibraryItem::new(7, "Seven")],
            &resolver,
        );

        while view.next_update().await.is_some() {}

        assert!(view.is_settled());
        assert_eq!(view.estimate(3), Some(3.0));
        assert_eq!(view.estimate(7), Some(7.0));
    }

    #[tokio::test]
    async fn test_no_match_leaves_estimate_absent() {
        let resolver = engine(vec![7]);
        let mut view = LibraryView::new();

        view.load(
            vec![LibraryItem::new(3, "Three"), LibraryItem::new(7, "Seven")],
            &resolver,
        );

        while view.next_update().await.is_some() {}

        assert!(view.is_settled());
        assert_eq!(view.estimate(3), Some(3.0));
        assert_eq!(view.estimate(7), None);
    }

    #[tokio::test]
    async fn test_sorted_reflects_partial_state() {
        let resolver = engine(vec![]);
        let mut view = LibraryView::new();

        view.load(
            vec![LibraryItem::new(9, "Nine"), LibraryItem::new(2, "Two")],
            &resolver,
        );

        // Before any update lands, both items are unresolved and order by
        // name.
        let initial = view.sorted(SortMode::Shortest);
        assert_eq!(initial[0].item.name, "Nine");
        assert_eq!(initial[1].item.name, "Two");

        while view.next_update().await.is_some() {}

        let settled = view.sorted(SortMode::Shortest);
        assert_eq!(settled[0].item.name, "Two");
        assert_eq!(settled[1].item.name, "Nine");
    }

    #[tokio::test]
    async fn test_drain_updates_never_blocks() {
        let resolver = engine(vec![]);
        let mut view = LibraryView::new();

        view.load(vec![LibraryItem::new(3, "Three")], &resolver);

        // Drain applies whatever has landed and returns immediately.
        while !view.is_settled() {
            view.drain_updates();
            tokio::task::yield_now().await;
        }
        assert_eq!(view.estimate(3), Some(3.0));
    }

    #[tokio::test]
    async fn test_dropped_view_ignores_late_results() {
        let cache = Arc::new(StatCache::new());
        let resolver = StatResolver::new(Arc::clone(&cache), Arc::new(IdHoursLookup { misses: vec![] }));

        let mut view = LibraryView::new();
        let item = LibraryItem::new(3, "Three");
        let key = CacheKey::for_item(&item);
        view.load(vec![item], &resolver);
        drop(view);

        // The lookup still completes the cache; the forwarder's send just
        // goes nowhere.
        let bundle = cache.subscribe(&key).await.unwrap();
        assert!(bundle.has_data);
    }
}
