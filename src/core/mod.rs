//! Core engine logic.
//!
//! This module contains:
//! - StatCache: keyed store with fetch deduplication and notification
//! - StatResolver: fire-and-forget per-item resolution
//! - LibraryView: live aggregation of items and estimates
//! - Sort: pure ordering over the aggregated state

pub mod cache;
pub mod resolver;
pub mod sort;
pub mod view;

// Re-export commonly used types
pub use cache::{CacheKey, StatCache};
pub use resolver::StatResolver;
pub use sort::{order, SortMode};
pub use view::{LibraryView, StatUpdate};
