//! Library sources: the local Steam install and JSON fixture files.
//!
//! Steam records each installed game as a `steamapps/appmanifest_<id>.acf`
//! manifest, a quoted key-value format. We only need three keys (`appid`,
//! `name`, `installdir`), so a line-level scan is enough; a full VDF parser
//! would be dead weight here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{LibraryError, LibrarySource};
use crate::domain::LibraryItem;

/// Library source backed by one or more Steam `steamapps` directories.
pub struct SteamLibrary {
    /// Steam library roots, each containing a `steamapps` directory.
    roots: Vec<PathBuf>,
}

impl SteamLibrary {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Single-root convenience constructor.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(vec![root.into()])
    }

    /// Scan one steamapps directory for app manifests.
    async fn scan_steamapps(&self, steamapps: &Path) -> Result<Vec<LibraryItem>, LibraryError> {
        let mut items = Vec::new();
        let mut entries = fs::read_dir(steamapps).await.map_err(|source| {
            LibraryError::Unreadable {
                path: steamapps.to_path_buf(),
                source,
            }
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| LibraryError::Unreadable {
                path: steamapps.to_path_buf(),
                source,
            })?
        {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.starts_with("appmanifest_") || !file_name.ends_with(".acf") {
                continue;
            }

            match fs::read_to_string(&path).await {
                Ok(content) => match parse_app_manifest(&content) {
                    Some(item) => items.push(item),
                    None => {
                        warn!(manifest = %path.display(), "skipping malformed app manifest");
                    }
                },
                Err(e) => {
                    warn!(manifest = %path.display(), error = %e, "skipping unreadable app manifest");
                }
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl LibrarySource for SteamLibrary {
    async fn load(&self) -> Result<Vec<LibraryItem>, LibraryError> {
        let mut items = Vec::new();

        for root in &self.roots {
            let steamapps = root.join("steamapps");
            if !steamapps.is_dir() {
                warn!(root = %root.display(), "no steamapps directory under library root");
                continue;
            }
            items.extend(self.scan_steamapps(&steamapps).await?);
        }

        if items.is_empty() {
            return Err(LibraryError::Empty);
        }

        debug!(count = items.len(), "loaded Steam library");
        Ok(items)
    }
}

/// Extract appid, name, and installdir from an acf manifest.
///
/// Lines look like `\t"name"\t\t"Portal 2"`; values never contain escaped
/// quotes in practice, so splitting on `"` is sufficient.
fn parse_app_manifest(content: &str) -> Option<LibraryItem> {
    let mut appid = None;
    let mut name = None;
    let mut installdir = None;

    for line in content.lines() {
        let mut fields = line.split('"').filter(|s| !s.trim().is_empty());
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };

        match key {
            "appid" => appid = value.parse::<u32>().ok(),
            "name" => name = Some(value.to_string()),
            "installdir" => installdir = Some(value.to_string()),
            _ => {}
        }
    }

    let mut item = LibraryItem::new(appid?, name?);
    if let Some(dir) = installdir {
        item = item.with_install_path(dir);
    }
    Some(item)
}

/// Library source backed by a JSON array of items.
///
/// Useful for fixtures and for machines where Steam is not installed:
/// `[{"id": 400, "name": "Portal"}, ...]`.
pub struct FileLibrary {
    path: PathBuf,
}

impl FileLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LibrarySource for FileLibrary {
    async fn load(&self) -> Result<Vec<LibraryItem>, LibraryError> {
        let content =
            fs::read_to_string(&self.path)
                .await
                .map_err(|source| LibraryError::Unreadable {
                    path: self.path.clone(),
                    source,
                })?;

        let items: Vec<LibraryItem> =
            serde_json::from_str(&content).map_err(|source| LibraryError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if items.is_empty() {
            return Err(LibraryError::Empty);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PORTAL_MANIFEST: &str = r#"
"AppState"
{
	"appid"		"400"
	"name"		"Portal"
	"installdir"		"Portal"
	"StateFlags"		"4"
}
"#;

    #[test]
    fn test_parse_app_manifest() {
        let item = parse_app_manifest(PORTAL_MANIFEST).unwrap();
        assert_eq!(item.id, 400);
        assert_eq!(item.name, "Portal");
        assert_eq!(item.install_path.as_deref(), Some("Portal"));
    }

    #[test]
    fn test_parse_manifest_missing_name() {
        assert!(parse_app_manifest("\"AppState\"\n{\n\t\"appid\"\t\t\"400\"\n}").is_none());
    }

    #[tokio::test]
    async fn test_scan_steamapps_dir() {
        let temp = TempDir::new().unwrap();
        let steamapps = temp.path().join("steamapps");
        std::fs::create_dir_all(&steamapps).unwrap();
        std::fs::write(steamapps.join("appmanifest_400.acf"), PORTAL_MANIFEST).unwrap();
        std::fs::write(steamapps.join("appmanifest_999.acf"), "not a manifest").unwrap();
        std::fs::write(steamapps.join("libraryfolders.vdf"), "ignored").unwrap();

        let library = SteamLibrary::with_root(temp.path());
        let items = library.load().await.unwrap();

        // The malformed manifest is skipped, not fatal.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Portal");
    }

    #[tokio::test]
    async fn test_empty_library_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("steamapps")).unwrap();

        let library = SteamLibrary::with_root(temp.path());
        assert!(matches!(library.load().await, Err(LibraryError::Empty)));
    }

    #[tokio::test]
    async fn test_file_library_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.json");
        std::fs::write(
            &path,
            r#"[{"id": 400, "name": "Portal", "playtime_minutes": 90}]"#,
        )
        .unwrap();

        let items = FileLibrary::new(&path).load().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].playtime_minutes, Some(90));
    }

    #[tokio::test]
    async fn test_file_library_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            FileLibrary::new(&path).load().await,
            Err(LibraryError::Malformed { .. })
        ));
    }
}
