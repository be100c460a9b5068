mod tabular;
mod types;

pub use tabular::{
    ACTIVITY_SCHEMA, ARTISTS_SCHEMA, CATALOG_SCHEMA, SONGPLAYS_SCHEMA, SONGS_SCHEMA, TIME_SCHEMA,
    USERS_SCHEMA,
};
pub use types::{
    ActivityRecord, ArtistRow, CatalogRecord, PlaybackEvent, SongPlayRow, SongRow, TimeRow,
    UserRow, PLAYBACK_PAGE,
};
