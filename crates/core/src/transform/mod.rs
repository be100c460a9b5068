mod dimensions;
mod error;
mod matcher;
mod songplays;
mod time;
mod timestamp;

pub use dimensions::{
    build_artists_table, build_songs_table, build_users_table, filter_playback,
};
pub use error::TransformError;
pub use matcher::{ExactMatch, NaturalKey, SongMatcher};
pub use songplays::{resolve_songplays, Resolution, ResolveStats};
pub use time::{build_time_table, time_row, weekday_number};
pub use timestamp::{derive_start_times, epoch_millis_to_timestamp, to_playback_events};
