//! HTTP client for the HowLongToBeat search API.
//!
//! The engine only ever asks one question of the reference source: "best
//! match for this name, please." The search endpoint takes the name split
//! into terms and returns a ranked list of games with their completion
//! stats as display strings; we pick a match and hand the raw strings back
//! unparsed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LookupCapability;
use crate::domain::MatchRecord;

const DEFAULT_ENDPOINT: &str = "https://howlongtobeat.com";

/// Search client for the reference source.
pub struct HltbClient {
    /// Base URL of the service.
    endpoint: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Request body for the search endpoint.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "searchType")]
    search_type: &'a str,
    #[serde(rename = "searchTerms")]
    search_terms: Vec<&'a str>,
    #[serde(rename = "searchPage")]
    search_page: u32,
    size: u32,
}

/// Response envelope from the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

/// One ranked search hit.
#[derive(Debug, Deserialize)]
struct SearchHit {
    game_id: u64,
    game_name: String,
    #[serde(default)]
    comp_main: String,
    #[serde(default)]
    comp_plus: String,
    #[serde(default)]
    comp_100: String,
    #[serde(default)]
    comp_all: String,
}

impl HltbClient {
    /// Create a client against the default public endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint (tests, mirrors).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the search URL.
    fn search_url(&self) -> String {
        format!("{}/api/search", self.endpoint.trim_end_matches('/'))
    }

    /// Page URL for a resolved record id.
    pub fn game_url(endpoint: &str, record_id: &str) -> String {
        format!("{}/game/{}", endpoint.trim_end_matches('/'), record_id)
    }

    /// Run the search and return the ranked hits.
    async fn search(&self, name: &str) -> Result<Vec<SearchHit>> {
        let terms: Vec<&str> = name.split_whitespace().collect();
        let body = SearchRequest {
            search_type: "games",
            search_terms: terms,
            search_page: 1,
            size: 20,
        };

        let response = self
            .client
            .post(self.search_url())
            .header(reqwest::header::REFERER, self.endpoint.as_str())
            .json(&body)
            .send()
            .await
            .context("Failed to reach the completion-time service")?
            .error_for_status()
            .context("Completion-time search was rejected")?;

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse completion-time search response")?;

        Ok(parsed.data)
    }

    /// Pick the best hit for a name: case-insensitive exact match when one
    /// exists, otherwise the service's top-ranked result.
    fn best_match(name: &str, hits: Vec<SearchHit>) -> Option<SearchHit> {
        let wanted = name.trim().to_lowercase();
        let exact = hits
            .iter()
            .position(|hit| hit.game_name.trim().to_lowercase() == wanted);

        match exact {
            Some(idx) => hits.into_iter().nth(idx),
            None => hits.into_iter().next(),
        }
    }
}

impl Default for HltbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupCapability for HltbClient {
    async fn find_match(&self, id_hint: u32, name_hint: &str) -> Result<Option<MatchRecord>> {
        let hits = self.search(name_hint).await?;
        debug!(id_hint, name = name_hint, hits = hits.len(), "search returned");

        Ok(Self::best_match(name_hint, hits).map(|hit| MatchRecord {
            main: hit.comp_main,
            main_plus: hit.comp_plus,
            completionist: hit.comp_100,
            all_styles: hit.comp_all,
            record_id: Some(hit.game_id.to_string()),
        }))
    }
}
