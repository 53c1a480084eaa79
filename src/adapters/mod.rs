//! Adapter interfaces for external systems.
//!
//! The engine consumes two capabilities it never implements itself: a
//! library source (where the list of games comes from) and a lookup
//! capability (where completion times come from). Both are traits so tests
//! can substitute in-memory doubles.

pub mod hltb;
pub mod steam;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{LibraryItem, MatchRecord};

// Re-export the concrete adapters
pub use hltb::HltbClient;
pub use steam::{FileLibrary, SteamLibrary};

/// Errors loading the local game library.
///
/// These are the only per-run failures that reach the user; everything
/// per-item is absorbed by the resolver.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No games found in the library")]
    Empty,

    #[error("Failed to read library data at {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Library data at {path} is not valid")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of the local game library.
#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// Load the full library once. Failure here is user-facing and stops
    /// the run; no stat resolution is attempted.
    async fn load(&self) -> Result<Vec<LibraryItem>, LibraryError>;
}

/// Best-match lookup against the external reference source.
#[async_trait]
pub trait LookupCapability: Send + Sync {
    /// Find the best match for an item, or `None` when the source knows
    /// nothing about it. Errors are treated as no-match by the resolver.
    async fn find_match(&self, id_hint: u32, name_hint: &str) -> Result<Option<MatchRecord>>;
}

#[async_trait]
impl<T: LookupCapability + ?Sized> LookupCapability for Arc<T> {
    async fn find_match(&self, id_hint: u32, name_hint: &str) -> Result<Option<MatchRecord>> {
        (**self).find_match(id_hint, name_hint).await
    }
}
