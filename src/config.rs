//! Configuration for playlength.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PLAYLENGTH_ENDPOINT, PLAYLENGTH_STEAM_ROOT)
//! 2. Config file (.playlength/config.yaml)
//! 3. Defaults (public reference endpoint, common Steam install paths)
//!
//! Config file discovery:
//! - Searches current directory and parents for .playlength/config.yaml
//! - Steam roots in the config file are used as given (absolute paths)

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
    #[serde(default)]
    pub steam: Option<SteamConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the completion-time service.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamConfig {
    /// Steam library roots, each containing a steamapps directory.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base URL of the completion-time service.
    pub endpoint: String,
    /// Steam library roots to scan.
    pub steam_roots: Vec<PathBuf>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".playlength").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &PathBuf) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Steam install locations worth trying when nothing is configured.
fn default_steam_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };

    [
        home.join(".steam/steam"),
        home.join(".local/share/Steam"),
        home.join("Library/Application Support/Steam"),
    ]
    .into_iter()
    .filter(|p| p.is_dir())
    .collect()
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let endpoint = if let Ok(env_endpoint) = std::env::var("PLAYLENGTH_ENDPOINT") {
        env_endpoint
    } else {
        file.lookup
            .and_then(|l| l.endpoint)
            .unwrap_or_else(|| "https://howlongtobeat.com".to_string())
    };

    let steam_roots = if let Ok(env_root) = std::env::var("PLAYLENGTH_STEAM_ROOT") {
        vec![PathBuf::from(env_root)]
    } else {
        let configured = file.steam.map(|s| s.roots).unwrap_or_default();
        if configured.is_empty() {
            default_steam_roots()
        } else {
            configured
        }
    };

    Ok(ResolvedConfig {
        endpoint,
        steam_roots,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".playlength");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
lookup:
  endpoint: https://hltb.example.test
steam:
  roots:
    - /mnt/games/SteamLibrary
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(
            config.lookup.unwrap().endpoint,
            Some("https://hltb.example.test".to_string())
        );
        assert_eq!(
            config.steam.unwrap().roots,
            vec![PathBuf::from("/mnt/games/SteamLibrary")]
        );
    }

    #[test]
    fn test_empty_config_file_is_valid() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "{}").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.lookup.is_none());
        assert!(config.steam.is_none());
    }
}
