use std::hash::Hash;

use crate::records::{CatalogRecord, PlaybackEvent};

/// Decides which catalog entries a playback event refers to.
///
/// The activity log carries no song or artist ids, only what the player
/// displayed. A matcher maps both sides onto a hashable key; events and
/// catalog records with equal keys are joined. `None` means the record can
/// never match.
pub trait SongMatcher: Send + Sync {
    type Key: Eq + Hash;

    fn catalog_key(&self, record: &CatalogRecord) -> Option<Self::Key>;

    fn event_key(&self, event: &PlaybackEvent) -> Option<Self::Key>;
}

/// Title, artist name and duration, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    title: String,
    artist_name: String,
    duration_bits: u64,
}

impl NaturalKey {
    /// Returns `None` for a NaN duration, which equals nothing.
    pub fn new(title: &str, artist_name: &str, duration: f64) -> Option<Self> {
        if duration.is_nan() {
            return None;
        }
        // -0.0 == 0.0 but their bit patterns differ
        let duration = if duration == 0.0 { 0.0 } else { duration };
        Some(Self {
            title: title.to_string(),
            artist_name: artist_name.to_string(),
            duration_bits: duration.to_bits(),
        })
    }
}

/// Joins on exact equality of title, artist name and duration.
///
/// Durations must be bit-for-bit equal floats: `210.0` and `210.00000001`
/// do not match. Events missing any of the three fields never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactMatch;

impl SongMatcher for ExactMatch {
    type Key = NaturalKey;

    fn catalog_key(&self, record: &CatalogRecord) -> Option<NaturalKey> {
        NaturalKey::new(&record.title, &record.artist_name, record.duration)
    }

    fn event_key(&self, event: &PlaybackEvent) -> Option<NaturalKey> {
        let record = &event.record;
        NaturalKey::new(
            record.song.as_deref()?,
            record.artist.as_deref()?,
            record.length?,
        )
    }
}
