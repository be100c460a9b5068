use thiserror::Error;

/// Errors raised by the pure transforms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Invalid epoch milliseconds: {0}")]
    InvalidEpoch(i64),
    #[error(
        "Invalid epoch milliseconds {millis} in playback event {playback_index} (session {session_id})"
    )]
    InvalidEventTimestamp {
        /// Zero-based position among the playback lines, after other pages are dropped.
        playback_index: usize,
        session_id: i64,
        millis: i64,
    },
}
