//! Library items and their sortable projection.

use serde::{Deserialize, Serialize};

/// A single game in the local library.
///
/// Owned by the library source; immutable once loaded for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Stable numeric identity (Steam app id).
    pub id: u32,

    /// Display name, as the store lists it.
    pub name: String,

    /// Where the game lives on disk.
    #[serde(default)]
    pub install_path: Option<String>,

    /// Cumulative playtime in minutes, when the source knows it.
    #[serde(default)]
    pub playtime_minutes: Option<u64>,
}

impl LibraryItem {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            install_path: None,
            playtime_minutes: None,
        }
    }

    /// Set the install path
    pub fn with_install_path(mut self, path: impl Into<String>) -> Self {
        self.install_path = Some(path.into());
        self
    }

    /// Set cumulative playtime
    pub fn with_playtime_minutes(mut self, minutes: u64) -> Self {
        self.playtime_minutes = Some(minutes);
        self
    }
}

/// A library item paired with its main-story estimate, ready for ordering.
///
/// Rebuilt from view state on every derivation; the sort engine never
/// mutates these in place.
#[derive(Debug, Clone)]
pub struct SortableItem {
    pub item: LibraryItem,

    /// Main-story hours, absent until the item's bundle resolves with a
    /// known value.
    pub main_hours: Option<f64>,
}

impl SortableItem {
    pub fn new(item: LibraryItem, main_hours: Option<f64>) -> Self {
        Self { item, main_hours }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fields() {
        let item = LibraryItem::new(620, "Portal 2")
            .with_install_path("/games/steamapps/common/Portal 2")
            .with_playtime_minutes(90);

        assert_eq!(item.id, 620);
        assert_eq!(item.name, "Portal 2");
        assert_eq!(item.playtime_minutes, Some(90));
    }

    #[test]
    fn test_json_defaults() {
        let item: LibraryItem =
            serde_json::from_str(r#"{"id": 400, "name": "Portal"}"#).unwrap();
        assert_eq!(item.install_path, None);
        assert_eq!(item.playtime_minutes, None);
    }
}
