use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::serde::deserialize_optional_string_or_number;

/// The page value that marks a song playback in the activity log.
pub const PLAYBACK_PAGE: &str = "NextSong";

/// One entry of the music catalog feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub song_id: String,
    #[serde(default)]
    pub num_songs: Option<i64>,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    /// Release year, `0` when unknown.
    pub year: i64,
    /// Track length in seconds.
    pub duration: f64,
}

/// One line of the listening-activity log.
///
/// Only `page`, `sessionId` and `ts` are present on every line; the rest are
/// null for logged-out sessions or non-playback pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub item_in_session: Option<i64>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Track length in seconds, as reported by the player.
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    pub page: String,
    #[serde(default)]
    pub registration: Option<f64>,
    pub session_id: i64,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    /// Event time in epoch milliseconds.
    pub ts: i64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub user_id: Option<String>,
}

impl ActivityRecord {
    /// Whether this line records a song playback.
    pub fn is_playback(&self) -> bool {
        self.page == PLAYBACK_PAGE
    }
}

/// A playback activity record with its derived start time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub record: ActivityRecord,
    pub start_time: NaiveDateTime,
}

/// Row of the songs dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

/// Row of the artists dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Row of the users dimension. The same user appears once per level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRow {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// Row of the time dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    /// ISO-8601 week of year.
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// 1 = Sunday through 7 = Saturday.
    pub weekday: i32,
}

/// Row of the song-play fact table.
///
/// `song_id` and `artist_id` are `None` when no catalog entry matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongPlayRow {
    pub start_time: NaiveDateTime,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub year: i32,
    pub month: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_record_deserialize() {
        let json = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;
        let record: CatalogRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.song_id, "SOMZWCG12A8C13C480");
        assert_eq!(record.artist_location.as_deref(), Some("California - LA"));
        assert_eq!(record.artist_latitude, None);
        assert_eq!(record.year, 0);
        assert_eq!(record.duration, 218.93179);
    }

    #[test]
    fn test_catalog_record_requires_song_id() {
        let json = r#"{"title": "x", "artist_id": "a", "artist_name": "n", "year": 0, "duration": 1.0}"#;
        assert!(serde_json::from_str::<CatalogRecord>(json).is_err());
    }

    #[test]
    fn test_activity_record_deserialize() {
        let json = r#"{"artist":"Des'ree","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":1,"lastName":"Summers","length":246.30812,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"You Gotta Be","status":200,"ts":1541106106796,"userAgent":"Mozilla/5.0","userId":"8"}"#;
        let record: ActivityRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_playback());
        assert_eq!(record.first_name.as_deref(), Some("Kaylee"));
        assert_eq!(record.session_id, 139);
        assert_eq!(record.ts, 1541106106796);
        assert_eq!(record.user_id.as_deref(), Some("8"));
        assert_eq!(record.length, Some(246.30812));
    }

    #[test]
    fn test_activity_record_logged_out_line() {
        let json = r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":0,"lastName":null,"length":null,"level":"free","location":null,"method":"PUT","page":"Login","registration":null,"sessionId":52,"song":null,"status":307,"ts":1541207073796,"userAgent":null,"userId":""}"#;
        let record: ActivityRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_playback());
        assert_eq!(record.user_id.as_deref(), Some(""));
        assert_eq!(record.song, None);
    }

    #[test]
    fn test_activity_record_rejects_non_numeric_ts() {
        let json = r#"{"page":"NextSong","sessionId":1,"ts":"yesterday"}"#;
        assert!(serde_json::from_str::<ActivityRecord>(json).is_err());
    }
}
