use std::collections::HashMap;

use chrono::Datelike;

use crate::records::{CatalogRecord, PlaybackEvent, SongPlayRow};

use super::matcher::SongMatcher;

/// Counters describing how playback events were resolved against the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Playback events considered.
    pub events: usize,
    /// Events that matched at least one catalog entry.
    pub matched: usize,
    /// Events emitted with null song and artist ids.
    pub unmatched: usize,
    /// Extra rows produced because an event matched several catalog entries.
    pub fanned_out: usize,
}

/// Output of [`resolve_songplays`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub rows: Vec<SongPlayRow>,
    pub stats: ResolveStats,
}

/// Left-outer joins playback events onto the catalog.
///
/// Every event yields at least one row. An event whose key matches several
/// catalog entries yields one row per entry, in catalog order. Rows come out
/// in event order.
pub fn resolve_songplays<M>(
    events: &[PlaybackEvent],
    catalog: &[CatalogRecord],
    matcher: &M,
) -> Resolution
where
    M: SongMatcher + ?Sized,
{
    let mut index: HashMap<M::Key, Vec<&CatalogRecord>> = HashMap::new();
    for record in catalog {
        if let Some(key) = matcher.catalog_key(record) {
            index.entry(key).or_default().push(record);
        }
    }

    let mut stats = ResolveStats {
        events: events.len(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(events.len());

    for event in events {
        let matches = matcher
            .event_key(event)
            .and_then(|key| index.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default();

        if matches.is_empty() {
            stats.unmatched += 1;
            rows.push(songplay_row(event, None));
            continue;
        }

        stats.matched += 1;
        stats.fanned_out += matches.len() - 1;
        rows.extend(matches.iter().map(|record| songplay_row(event, Some(record))));
    }

    Resolution { rows, stats }
}

fn songplay_row(event: &PlaybackEvent, song: Option<&CatalogRecord>) -> SongPlayRow {
    let record = &event.record;
    SongPlayRow {
        start_time: event.start_time,
        user_id: record.user_id.clone(),
        level: record.level.clone(),
        song_id: song.map(|s| s.song_id.clone()),
        artist_id: song.map(|s| s.artist_id.clone()),
        session_id: record.session_id,
        location: record.location.clone(),
        user_agent: record.user_agent.clone(),
        year: event.start_time.year(),
        month: event.start_time.month() as i32,
    }
}
