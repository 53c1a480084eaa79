//! Command-line interface for playlength.
//!
//! Provides commands for listing the library sorted by completion time,
//! looking up a single title, and inspecting the resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::adapters::{FileLibrary, HltbClient, LibrarySource, LookupCapability, SteamLibrary};
use crate::config;
use crate::core::{CacheKey, LibraryView, SortMode, StatCache, StatResolver};
use crate::domain::{HourValue, SortableItem, StatBundle};

/// playlength - sort your game library by how long it takes to beat
#[derive(Parser, Debug)]
#[command(name = "playlength")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the library, sorted by main-story completion time
    List {
        /// Sort direction
        #[arg(short, long, value_enum, default_value = "shortest")]
        sort: SortArg,

        /// Show all four completion-time fields per game
        #[arg(short, long)]
        details: bool,

        /// Load the library from a JSON file instead of Steam
        #[arg(long)]
        from_json: Option<PathBuf>,
    },

    /// Look up completion times for a single title
    Lookup {
        /// Title to search for
        name: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Sort direction for the CLI (maps to SortMode)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Shortest games first
    Shortest,

    /// Longest games first
    Longest,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Shortest => SortMode::Shortest,
            SortArg::Longest => SortMode::Longest,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::List {
                sort,
                details,
                from_json,
            } => list_library(sort.into(), details, from_json).await,
            Commands::Lookup { name } => lookup_title(&name).await,
            Commands::Config => show_config(),
        }
    }
}

/// Load the library, resolve every item, and print the sorted listing.
async fn list_library(mode: SortMode, details: bool, from_json: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;

    let source: Box<dyn LibrarySource> = match from_json {
        Some(path) => Box::new(FileLibrary::new(path)),
        None => Box::new(SteamLibrary::new(cfg.steam_roots.clone())),
    };

    // A library-load failure is the one user-facing error: report it and
    // do no resolution.
    let items = source
        .load()
        .await
        .context("Failed to load your game library")?;

    println!("Found {} games, fetching completion times...", items.len());

    let cache = Arc::new(StatCache::new());
    let lookup: Arc<dyn LookupCapability> =
        Arc::new(HltbClient::with_endpoint(cfg.endpoint.clone()));
    let resolver = StatResolver::new(Arc::clone(&cache), lookup);

    let mut view = LibraryView::new();
    view.load(items, &resolver);

    let total = view.len();
    let mut resolved = 0usize;
    while view.next_update().await.is_some() {
        resolved += 1;
        info!(resolved, total, "completion times landing");
    }

    print_listing(&view.sorted(mode), &cache, &cfg.endpoint, details);
    Ok(())
}

/// Print the sorted table, optionally expanding each game's full stats.
fn print_listing(sorted: &[SortableItem], cache: &StatCache, endpoint: &str, details: bool) {
    println!();
    for entry in sorted {
        let badge = match entry.main_hours {
            Some(hours) => format!("{}", HourValue::Known(hours)),
            None => "--".to_string(),
        };
        let playtime = entry
            .item
            .playtime_minutes
            .map(format_playtime)
            .unwrap_or_default();

        println!("{:<44} {:>8}  {}", entry.item.name, badge, playtime);

        if !details {
            continue;
        }
        let Some(bundle) = cache.get(&CacheKey::for_item(&entry.item)) else {
            continue;
        };
        if !bundle.has_data {
            continue;
        }

        print_field("Main Story", bundle.main);
        print_field("Main + Extras", bundle.main_plus);
        print_field("Completionist", bundle.completionist);
        print_field("All Styles", bundle.all_styles);
        if let Some(ref record_id) = bundle.record_id {
            println!("    {}", HltbClient::game_url(endpoint, record_id));
        }
    }
}

/// One expanded stat row; placeholder fields stay hidden, as on the site.
fn print_field(label: &str, value: HourValue) {
    if value.is_known() {
        println!("    {:<15} {}", format!("{}:", label), value);
    }
}

/// Render cumulative playtime minutes as `3h 25m`.
fn format_playtime(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Direct single-title lookup with the full four-field breakdown.
async fn lookup_title(name: &str) -> Result<()> {
    let cfg = config::config()?;
    let client = HltbClient::with_endpoint(cfg.endpoint.clone());

    let record = client
        .find_match(0, name)
        .await
        .context("Lookup failed")?;

    let Some(record) = record else {
        println!("No match for '{}'", name);
        return Ok(());
    };

    let bundle = StatBundle::from_record(&record);
    println!("Completion times for '{}':", name);
    println!("  Main Story:     {}", bundle.main);
    println!("  Main + Extras:  {}", bundle.main_plus);
    println!("  Completionist:  {}", bundle.completionist);
    println!("  All Styles:     {}", bundle.all_styles);

    if let Some(ref record_id) = bundle.record_id {
        println!("  {}", HltbClient::game_url(&cfg.endpoint, record_id));
    }

    Ok(())
}

/// Print resolved configuration.
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Resolved configuration:");
    println!("  endpoint:     {}", cfg.endpoint);
    match &cfg.config_file {
        Some(path) => println!("  config file:  {}", path.display()),
        None => println!("  config file:  (none found)"),
    }
    if cfg.steam_roots.is_empty() {
        println!("  steam roots:  (none detected)");
    }
    for root in &cfg.steam_roots {
        println!("  steam root:   {}", root.display());
    }

    Ok(())
}
