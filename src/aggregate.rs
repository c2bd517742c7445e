//! Episode aggregation across catalog pages.
//!
//! Pages are fetched one at a time until the catalog runs dry, every entry is
//! run through the label parser, duplicates are dropped (first seen wins) and
//! the survivors are put in release order: plain numbers, then numbered parts
//! ("12_2"), then ranges ("12-13"), then other suffixes, then end markers
//! ("12_END").

use crate::error::{AppError, Result};
use crate::label::{self, parse};
use crate::types::{EpisodePage, EpisodeRecord, RawEpisodeEntry};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::future::Future;

/// Page size requested from the catalog.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Something that can hand out pages of raw episode entries.
pub trait EpisodePageSource {
    /// Fetch the page starting at `offset`.
    ///
    /// Implementations report "no such media" as [`AppError::NotFound`] and
    /// every other failure as [`AppError::Upstream`].
    fn fetch_page(&mut self, offset: u32, limit: u32) -> impl Future<Output = Result<EpisodePage>>;
}

/// Collect every page from `source` into one ordered, deduplicated list.
///
/// Fails with [`AppError::NotFound`] when no page yields an episode. Errors
/// from the source are returned as-is and stop paging immediately.
pub async fn aggregate<S>(source: &mut S, media_id: i64, limit: u32) -> Result<Vec<EpisodeRecord>>
where
    S: EpisodePageSource,
{
    let mut offset = 0u32;
    let mut buffer = Vec::new();

    loop {
        let page = source.fetch_page(offset, limit).await?;
        debug!(
            "Page at offset {} returned {} episodes (has next: {})",
            offset,
            page.episodes.len(),
            page.has_next_page
        );

        if page.episodes.is_empty() {
            break;
        }

        buffer.extend(page.episodes.iter().map(|entry| build_record(entry, media_id)));

        if !page.has_next_page {
            break;
        }

        offset = offset.saturating_add(limit);
    }

    if buffer.is_empty() {
        return Err(AppError::NotFound(format!(
            "No episodes found for media ID: {}",
            media_id
        )));
    }

    let mut records = dedup_first_wins(buffer);
    sort_episodes(&mut records);

    debug!(
        "Aggregated {} episodes for media {}",
        records.len(),
        media_id
    );

    Ok(records)
}

/// Turn one raw entry into an episode record.
pub fn build_record(entry: &RawEpisodeEntry, media_id: i64) -> EpisodeRecord {
    let parsed = parse(&entry.episode_number);
    EpisodeRecord {
        identifier: entry.episode_id.clone(),
        canonical_key: parsed.canonical_key(),
        ordering_number: parsed.base_number,
        display_title: parsed.display_title,
        server: entry.server.clone(),
        media_id,
    }
}

/// Keep the first record for every canonical key, preserving encounter order.
pub fn dedup_first_wins(records: Vec<EpisodeRecord>) -> Vec<EpisodeRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.canonical_key.clone()))
        .collect()
}

pub fn sort_episodes(records: &mut [EpisodeRecord]) {
    records.sort_by(compare_episodes);
}

/// Shape of a canonical key among records sharing an ordering number.
///
/// Declaration order is sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Variant {
    /// "12"
    Plain,
    /// "12_2", ordered by the part number
    Part(u64),
    /// "12-13", or anything else with a dash
    Range,
    /// "12_x"
    Suffixed,
    /// "12_END"
    EndMarker,
}

impl Variant {
    fn of(key: &str) -> Self {
        let has_underscore = key.contains('_');
        let has_dash = key.contains('-');

        if !has_underscore && !has_dash {
            return Variant::Plain;
        }
        if has_dash {
            return Variant::Range;
        }
        if let Some(part) = label::underscore_part(key) {
            return Variant::Part(part);
        }
        if label::is_end_marker(key) {
            Variant::EndMarker
        } else {
            Variant::Suffixed
        }
    }
}

/// Total order used for the final episode list.
///
/// Ordering number first, then the key's [`Variant`]. Ranges compare by key
/// alone; every other tie is broken by server name and then by key. Names
/// and keys compare case-insensitively first.
pub fn compare_episodes(a: &EpisodeRecord, b: &EpisodeRecord) -> Ordering {
    a.ordering_number
        .cmp(&b.ordering_number)
        .then_with(|| {
            let variant = Variant::of(&a.canonical_key);
            variant
                .cmp(&Variant::of(&b.canonical_key))
                .then_with(|| match variant {
                    Variant::Range => Ordering::Equal,
                    _ => collate(server_name(a), server_name(b)),
                })
        })
        .then_with(|| collate(&a.canonical_key, &b.canonical_key))
}

/// Case-insensitive comparison, with byte order deciding exact ties.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn server_name(record: &EpisodeRecord) -> &str {
    record.server.as_deref().unwrap_or("")
}
