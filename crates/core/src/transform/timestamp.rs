use chrono::{DateTime, NaiveDateTime};

use crate::records::{ActivityRecord, PlaybackEvent};

use super::dimensions::filter_playback;
use super::error::TransformError;

/// Converts epoch milliseconds to a calendar timestamp.
///
/// The epoch is interpreted in UTC, so the result does not depend on the host
/// time zone. Negative and out-of-range inputs are rejected.
pub fn epoch_millis_to_timestamp(millis: i64) -> Result<NaiveDateTime, TransformError> {
    if millis < 0 {
        return Err(TransformError::InvalidEpoch(millis));
    }
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or(TransformError::InvalidEpoch(millis))
}

/// Attaches a `start_time` to each record.
///
/// Fails on the first record with an invalid epoch, naming its position in
/// `records`.
pub fn derive_start_times(
    records: Vec<ActivityRecord>,
) -> Result<Vec<PlaybackEvent>, TransformError> {
    records
        .into_iter()
        .enumerate()
        .map(|(playback_index, record)| {
            let start_time = epoch_millis_to_timestamp(record.ts).map_err(|_| {
                TransformError::InvalidEventTimestamp {
                    playback_index,
                    session_id: record.session_id,
                    millis: record.ts,
                }
            })?;
            Ok(PlaybackEvent { record, start_time })
        })
        .collect()
}

/// Keeps the playback lines of an activity log and derives their start times.
pub fn to_playback_events(
    records: Vec<ActivityRecord>,
) -> Result<Vec<PlaybackEvent>, TransformError> {
    derive_start_times(filter_playback(records))
}
