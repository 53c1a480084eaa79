//! playlength - sort your game library by how long it takes to beat
//!
//! Augments a local game library with completion-time estimates from an
//! external reference source and re-orders it by estimated play length.
//!
//! # Architecture
//!
//! The engine is built around a deduplicating stat cache:
//! - Each library item gets at most one outstanding lookup per session
//! - Results land asynchronously and update items independently
//! - The displayed order is a pure function of current state, re-derived
//!   on every update and every sort-mode change
//!
//! # Modules
//!
//! - `adapters`: External system integrations (Steam library, lookup service)
//! - `core`: Engine logic (StatCache, StatResolver, LibraryView, sort)
//! - `domain`: Data structures (LibraryItem, StatBundle, HourValue)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Shortest games first
//! playlength list
//!
//! # Longest first, with the full per-game breakdown
//! playlength list --sort longest --details
//!
//! # One-off lookup
//! playlength lookup "Portal 2"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{HltbClient, LibraryError, LibrarySource, LookupCapability};
pub use core::{LibraryView, SortMode, StatCache, StatResolver};
pub use domain::{parse_hours, HourValue, LibraryItem, SortableItem, StatBundle};
