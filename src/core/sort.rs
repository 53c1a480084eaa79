//! Ordering of the aggregated library.

use std::cmp::Ordering;

use crate::domain::SortableItem;

/// User-selectable sort direction over main-story hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Shortest games first.
    Shortest,
    /// Longest games first.
    Longest,
}

/// Produce the display order for a set of items.
///
/// Total and deterministic:
/// - an item without an estimate sorts after every item with one,
///   regardless of direction — unresolved games never outrank resolved
///   ones;
/// - two unresolved items order by display name (case-sensitive), so their
///   relative position is stable while lookups are still landing;
/// - two resolved items compare numerically per mode, ties broken by name.
///
/// The ordering is recomputed wholesale from its inputs; nothing is
/// patched incrementally and the inputs are not mutated.
pub fn order(items: &[SortableItem], mode: SortMode) -> Vec<SortableItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| compare(a, b, mode));
    sorted
}

fn compare(a: &SortableItem, b: &SortableItem, mode: SortMode) -> Ordering {
    match (a.main_hours, b.main_hours) {
        (None, None) => a.item.name.cmp(&b.item.name),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ha), Some(hb)) => {
            let numeric = match mode {
                SortMode::Shortest => ha.total_cmp(&hb),
                SortMode::Longest => hb.total_cmp(&ha),
            };
            numeric.then_with(|| a.item.name.cmp(&b.item.name))
        }
    }
}
