use crate::records::{ActivityRecord, ArtistRow, CatalogRecord, SongRow, UserRow};
use crate::table::dedup_rows;

/// Keeps only song playback lines.
pub fn filter_playback(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    records
        .into_iter()
        .filter(ActivityRecord::is_playback)
        .collect()
}

/// Projects catalog records onto the songs dimension.
///
/// One row per catalog record; duplicate song ids pass through unchanged.
pub fn build_songs_table(catalog: &[CatalogRecord]) -> Vec<SongRow> {
    catalog
        .iter()
        .map(|record| SongRow {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        })
        .collect()
}

/// Projects catalog records onto the artists dimension, dropping identical rows.
pub fn build_artists_table(catalog: &[CatalogRecord]) -> Vec<ArtistRow> {
    let rows = catalog
        .iter()
        .map(|record| ArtistRow {
            artist_id: record.artist_id.clone(),
            name: record.artist_name.clone(),
            location: record.artist_location.clone(),
            latitude: record.artist_latitude,
            longitude: record.artist_longitude,
        })
        .collect();
    dedup_rows(rows)
}

/// Projects activity records onto the users dimension, dropping identical rows.
///
/// A user who changed level keeps one row per level.
pub fn build_users_table<'a, I>(activity: I) -> Vec<UserRow>
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let rows = activity
        .into_iter()
        .map(|record| UserRow {
            user_id: record.user_id.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            gender: record.gender.clone(),
            level: record.level.clone(),
        })
        .collect();
    dedup_rows(rows)
}
