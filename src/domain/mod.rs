//! Domain types for the playlength engine.
//!
//! This module contains the core data structures:
//! - LibraryItem / SortableItem: what the user's library looks like
//! - HourValue and the duration parser: normalized completion times
//! - StatBundle / MatchRecord: resolved estimates and their raw form

pub mod duration;
pub mod item;
pub mod stats;

// Re-export commonly used types
pub use duration::{parse_hours, HourValue, PLACEHOLDER};
pub use item::{LibraryItem, SortableItem};
pub use stats::{MatchRecord, StatBundle};
