//! Filesystem error mapping.
//!
//! Maps `std::io::Error` and blocking-task failures to `StorageError` from
//! `songlake_core::storage`.

use std::io::{self, ErrorKind};

use songlake_core::storage::StorageError;
use tokio::task::JoinError;

/// Map an I/O error on `location` to StorageError.
pub fn map_io_error(err: io::Error, location: impl Into<String>) -> StorageError {
    let location = location.into();
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound { location },
        ErrorKind::AlreadyExists => StorageError::AlreadyExists { location },
        ErrorKind::InvalidData => StorageError::Encoding(format!("{location}: {err}")),
        _ => StorageError::Io(format!("{location}: {err}")),
    }
}

/// Map a directory walk error on `location` to StorageError.
pub fn map_walk_error(err: walkdir::Error, location: &str) -> StorageError {
    match err.into_io_error() {
        Some(io_err) => map_io_error(io_err, location),
        None => StorageError::Io(format!("{location}: filesystem loop detected")),
    }
}

/// Map a failed blocking task to StorageError.
pub fn map_join_error(err: JoinError) -> StorageError {
    StorageError::Io(format!("Storage task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_location() {
        let err = io::Error::new(ErrorKind::NotFound, "gone");
        assert_eq!(
            map_io_error(err, "songs/songs.parquet"),
            StorageError::NotFound {
                location: "songs/songs.parquet".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_data_is_an_encoding_error() {
        let err = io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert_eq!(
            map_io_error(err, "a.json"),
            StorageError::Encoding("a.json: stream did not contain valid UTF-8".to_string())
        );
    }

    #[test]
    fn test_other_errors_are_io() {
        let err = io::Error::new(ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            map_io_error(err, "time"),
            StorageError::Io("time: denied".to_string())
        );
    }
}
