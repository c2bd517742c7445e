//! API client for the Hasukatsu catalog.
//!
//! This module wraps the three endpoints the provider needs: title search,
//! the paginated episode listing and per-episode source lookup. Status codes
//! are translated into [`AppError`] here; nothing is retried.

use crate::aggregate::EpisodePageSource;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{ApiErrorBody, EpisodePage, SearchResponse, SourceResponse};
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Error codes the catalog uses on a 404 when it has nothing for a media id.
const NOT_FOUND_CODES: [&str; 2] = ["MAPPING_NOT_FOUND", "EPISODES_NOT_FOUND"];

/// HTTP client bound to one catalog base URL.
#[derive(Debug, Clone)]
pub struct HasukatsuClient {
    client: reqwest::Client,
    base_url: String,
}

impl HasukatsuClient {
    /// Build a client from the configured base URL and timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the catalog by title.
    ///
    /// Any non-2xx status is returned as [`AppError::Upstream`]; callers on the
    /// search path are expected to degrade that to an empty list.
    pub async fn search(&self, title: &str, limit: u32) -> Result<SearchResponse> {
        debug!("Searching catalog for '{}'", title);

        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("title", title.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::upstream_status(status));
        }

        Ok(resp.json().await?)
    }

    /// Fetch one page of the episode listing for `media_id`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] - 404 carrying a "no mapping" or "no episodes" code
    /// - [`AppError::Upstream`] - any other non-2xx status, or a transport failure
    /// - [`AppError::Parse`] - a 2xx body that is not an episode page
    pub async fn fetch_episode_page(
        &self,
        media_id: i64,
        provider: &str,
        limit: u32,
        offset: u32,
    ) -> Result<EpisodePage> {
        debug!(
            "Fetching episodes for media {} (offset {}, limit {})",
            media_id, offset, limit
        );

        let resp = self
            .client
            .get(format!("{}/stream/episodes", self.base_url))
            .query(&[
                ("id", media_id.to_string()),
                ("provider", provider.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_episodes_failure(status, &body, media_id));
        }

        Ok(resp.json().await?)
    }

    /// Look up the stream source of an episode on a server.
    pub async fn fetch_source(&self, episode_data: &str, server: &str) -> Result<SourceResponse> {
        debug!("Fetching source for episode {} on {}", episode_data, server);

        let resp = self
            .client
            .get(format!("{}/stream/source", self.base_url))
            .query(&[("episodeData", episode_data), ("server", server)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::upstream_status(status));
        }

        Ok(resp.json().await?)
    }
}

/// Map a failed episode page response to an error.
///
/// Only a 404 whose JSON body names a known "nothing here" code becomes
/// [`AppError::NotFound`]; every other failure keeps its status.
pub fn classify_episodes_failure(status: StatusCode, body: &str, media_id: i64) -> AppError {
    if status == StatusCode::NOT_FOUND {
        let code = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.code);
        if code.is_some_and(|c| NOT_FOUND_CODES.contains(&c.as_str())) {
            return AppError::NotFound(format!("No episodes found for media ID: {}", media_id));
        }
    }
    AppError::upstream_status(status)
}

/// The episode listing of one media, as a page source for aggregation.
pub struct MediaEpisodes<'a> {
    client: &'a HasukatsuClient,
    media_id: i64,
    provider: &'a str,
}

impl<'a> MediaEpisodes<'a> {
    pub fn new(client: &'a HasukatsuClient, media_id: i64, provider: &'a str) -> Self {
        Self {
            client,
            media_id,
            provider,
        }
    }
}

impl EpisodePageSource for MediaEpisodes<'_> {
    async fn fetch_page(&mut self, offset: u32, limit: u32) -> Result<EpisodePage> {
        self.client
            .fetch_episode_page(self.media_id, self.provider, limit, offset)
            .await
    }
}
