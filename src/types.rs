//! Type definitions for the animevsub-provider crate.
//!
//! Wire types mirror the Hasukatsu JSON payloads and default every optional
//! field at the deserialization boundary. Output types are what the host
//! application consumes.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One episode entry as returned by a page of `/stream/episodes`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawEpisodeEntry {
    /// Free-form episode label such as "12", "12_2", "5-6" or "3_END".
    #[serde(
        rename = "episodeNumber",
        default,
        deserialize_with = "deserialize_label"
    )]
    pub episode_number: String,

    /// Opaque token used later to fetch sources.
    #[serde(rename = "episodeId")]
    pub episode_id: String,

    /// Origin-server hint. Empty strings are treated as absent.
    #[serde(default, deserialize_with = "deserialize_server")]
    pub server: Option<String>,
}

/// Accept a string, a number, or nothing for the episode label.
fn deserialize_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Label>::deserialize(deserializer)? {
        Some(Label::Text(text)) => text,
        Some(Label::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

fn deserialize_server<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let server = Option::<String>::deserialize(deserializer)?;
    Ok(server.filter(|s| !s.is_empty()))
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the paginated episode listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodePage {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    /// A null or missing flag means this is the last page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next_page: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episodes: Vec<RawEpisodeEntry>,
}

/// Error body attached to a non-2xx episode page.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
}

/// A deduplicated, ordered episode ready for the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Episode id, used as the key for source resolution.
    pub identifier: String,

    /// Presentation title, e.g. "Episode 5" or "Episode 5-6".
    pub display_title: String,

    /// Numeric ordering key, coerced to the 32-bit signed range.
    pub ordering_number: i32,

    /// Key used to detect duplicates across pages.
    pub canonical_key: String,

    /// Server the entry was served from, if the catalog said so.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Media the episode belongs to.
    pub media_id: i64,
}

impl EpisodeRecord {
    /// Format the episode for display in listings.
    ///
    /// # Examples
    ///
    /// ```
    /// use animevsub_provider::types::EpisodeRecord;
    ///
    /// let ep = EpisodeRecord {
    ///     identifier: "abc".to_string(),
    ///     display_title: "Episode 5-6".to_string(),
    ///     ordering_number: 5,
    ///     canonical_key: "5-6".to_string(),
    ///     server: Some("AnimeVsub".to_string()),
    ///     media_id: 21,
    /// };
    /// assert_eq!(ep.to_display(), "Episode 5-6 [AnimeVsub]");
    /// ```
    pub fn to_display(&self) -> String {
        match &self.server {
            Some(server) => format!("{} [{}]", self.display_title, server),
            None => self.display_title.clone(),
        }
    }
}

/// Titles of a search hit in the languages the catalog knows.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Titles {
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub ja: Option<String>,
    #[serde(default)]
    pub vi: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Images {
    #[serde(default)]
    pub cover_xl: Option<String>,
    #[serde(default)]
    pub cover_lg: Option<String>,
    #[serde(default)]
    pub cover_md: Option<String>,
}

/// One hit of `/search`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: i64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub titles: Titles,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `/search`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchItem>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next_page: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubOrDub {
    Sub,
    Dub,
}

/// A search result handed to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub sub_or_dub: SubOrDub,
}

impl SearchResult {
    /// Format the result for display in listings.
    ///
    /// # Examples
    ///
    /// ```
    /// use animevsub_provider::types::{SearchResult, SubOrDub};
    ///
    /// let result = SearchResult {
    ///     id: "21".to_string(),
    ///     title: "One Piece".to_string(),
    ///     url: String::new(),
    ///     sub_or_dub: SubOrDub::Sub,
    /// };
    /// assert_eq!(result.to_display(), "One Piece (21)");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{} ({})", self.title, self.id)
    }
}

/// Response of `/stream/source`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cors_proxy_required: bool,
    #[serde(default)]
    pub proxy_headers: Option<BTreeMap<String, String>>,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSourceType {
    M3u8,
    Mp4,
    Unknown,
}

/// A playable stream for an episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoSource {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: VideoSourceType,
    pub quality: String,
    pub subtitles: Vec<String>,
}

/// Streams of one episode on one server, plus the headers needed to play them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeServer {
    pub server: String,
    pub headers: BTreeMap<String, String>,
    pub video_sources: Vec<VideoSource>,
}
