//! The ANIMEVIETSUB provider.
//!
//! Ties the catalog client to the host-facing operations: search, episode
//! listing and source resolution.

use crate::aggregate::aggregate;
use crate::api::{HasukatsuClient, MediaEpisodes};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{
    EpisodeRecord, EpisodeServer, SearchItem, SearchResult, SourceResponse, SubOrDub, VideoSource,
    VideoSourceType,
};
use log::{debug, info, warn};
use regex::Regex;
use std::sync::LazyLock;

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").expect("leading integer pattern"));

/// What the provider can do, as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    pub episode_servers: Vec<String>,
    pub supports_dub: bool,
}

/// Media the host already resolved, identified by its AniList id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaHint {
    pub id: i64,
    pub english_title: Option<String>,
    pub romaji_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: String,
    pub media: Option<MediaHint>,
}

impl SearchOptions {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            media: None,
        }
    }
}

pub struct Provider {
    client: HasukatsuClient,
    config: Config,
}

impl Provider {
    pub fn new(config: Config) -> Result<Self> {
        let client = HasukatsuClient::new(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> ProviderSettings {
        ProviderSettings {
            episode_servers: vec![self.config.default_server.clone()],
            supports_dub: false,
        }
    }

    /// Search for media by title.
    ///
    /// The catalog keys media by AniList id, so a hint with an id is answered
    /// directly. Failures never surface here: they are logged and an empty
    /// list is returned.
    pub async fn search(&self, opts: &SearchOptions) -> Vec<SearchResult> {
        if let Some(media) = opts.media.as_ref().filter(|m| m.id != 0) {
            let title = first_non_empty(&[
                media.english_title.as_deref(),
                media.romaji_title.as_deref(),
            ])
            .unwrap_or(&opts.query);
            return vec![search_result(media.id, title)];
        }

        let resp = match self
            .client
            .search(&opts.query, self.config.search_limit)
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Search for '{}' failed: {}", opts.query, e);
                return Vec::new();
            }
        };

        if !resp.success {
            debug!("Search for '{}' reported no success", opts.query);
            return Vec::new();
        }

        let results: Vec<SearchResult> = resp
            .results
            .iter()
            .map(|item| search_result(item.id, item_title(item, &opts.query)))
            .collect();

        debug!("Found {} results for '{}'", results.len(), opts.query);
        results
    }

    /// List the episodes of a media, deduplicated and in release order.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] - `id` is not an integer
    /// - [`AppError::NotFound`] - the catalog has no episodes for the media
    /// - [`AppError::Upstream`] - the catalog failed
    pub async fn find_episodes(&self, id: &str) -> Result<Vec<EpisodeRecord>> {
        let media_id = parse_media_id(id)?;
        let mut source = MediaEpisodes::new(&self.client, media_id, &self.config.provider_name);

        let episodes = aggregate(&mut source, media_id, self.config.page_limit)
            .await
            .inspect_err(|e| warn!("Listing episodes of media {} failed: {}", media_id, e))?;

        info!("Found {} episodes for media {}", episodes.len(), media_id);
        Ok(episodes)
    }

    /// Resolve the playable stream of an episode.
    ///
    /// An empty or `"default"` server falls back to the server the episode
    /// was listed on, then to the configured default.
    pub async fn find_episode_server(
        &self,
        episode: &EpisodeRecord,
        server: &str,
    ) -> Result<EpisodeServer> {
        let server_name = choose_server(
            server,
            episode.server.as_deref(),
            &self.config.default_server,
        );

        let source = self
            .client
            .fetch_source(&episode.identifier, &server_name)
            .await
            .inspect_err(|e| warn!("Source lookup for {} failed: {}", episode.identifier, e))?;

        Ok(build_episode_server(source, server_name, self.client.base_url()))
    }
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().flatten().copied().find(|s| !s.is_empty())
}

fn item_title<'a>(item: &'a SearchItem, query: &'a str) -> &'a str {
    first_non_empty(&[
        item.titles.en.as_deref(),
        item.titles.vi.as_deref(),
        item.titles.ja.as_deref(),
    ])
    .unwrap_or(query)
}

fn search_result(id: i64, title: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        title: title.to_string(),
        url: String::new(),
        sub_or_dub: SubOrDub::Sub,
    }
}

/// Parse a caller supplied media id from its leading integer.
///
/// Trailing text is ignored, so "21abc" and "21.0" both give 21.
///
/// ```
/// use animevsub_provider::provider::parse_media_id;
///
/// assert_eq!(parse_media_id(" 21.0").unwrap(), 21);
/// assert!(parse_media_id("one piece").is_err());
/// ```
pub fn parse_media_id(id: &str) -> Result<i64> {
    LEADING_INTEGER
        .find(id.trim())
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid media ID: {}", id)))
}

pub fn choose_server(requested: &str, episode_server: Option<&str>, default: &str) -> String {
    if !requested.is_empty() && requested != "default" {
        return requested.to_string();
    }
    episode_server
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Classify a stream from the catalog's type tag and its URL.
pub fn video_kind(kind: &str, url: &str) -> VideoSourceType {
    if kind == "HLS" || url.contains(".m3u8") || url.contains("/m3u8/") {
        VideoSourceType::M3u8
    } else if kind == "EMBED" {
        VideoSourceType::Unknown
    } else if url.contains(".mp4") {
        VideoSourceType::Mp4
    } else {
        VideoSourceType::Unknown
    }
}

/// Make catalog-relative URLs absolute.
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        url.to_string()
    }
}

fn build_episode_server(source: SourceResponse, server: String, base_url: &str) -> EpisodeServer {
    let kind = video_kind(&source.kind, &source.url);

    EpisodeServer {
        server,
        headers: source.proxy_headers.unwrap_or_default(),
        video_sources: vec![VideoSource {
            url: resolve_url(base_url, &source.url),
            kind,
            quality: "auto".to_string(),
            subtitles: Vec::new(),
        }],
    }
}
