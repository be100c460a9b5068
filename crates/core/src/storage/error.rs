use thiserror::Error;

/// Errors that can occur while moving tables or source files through storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{location} not found")]
    NotFound { location: String },
    #[error("{location} already exists")]
    AlreadyExists { location: String },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_not_found_display() {
        let error = StorageError::NotFound {
            location: "staging_songs/staging_songs.parquet".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "staging_songs/staging_songs.parquet not found"
        );
    }

    #[test]
    fn test_storage_error_already_exists_display() {
        let error = StorageError::AlreadyExists {
            location: "songs/songs.parquet".to_string(),
        };
        assert_eq!(error.to_string(), "songs/songs.parquet already exists");
    }

    #[test]
    fn test_storage_error_connection_failed_display() {
        let error = StorageError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_storage_error_io_display() {
        let error = StorageError::Io("permission denied".to_string());
        assert_eq!(error.to_string(), "I/O error: permission denied");
    }

    #[test]
    fn test_storage_error_encoding_display() {
        let error = StorageError::Encoding("bad footer".to_string());
        assert_eq!(error.to_string(), "Encoding error: bad footer");
    }

    #[test]
    fn test_storage_error_invalid_data_display() {
        let error = StorageError::InvalidData("unknown partition column".to_string());
        assert_eq!(error.to_string(), "Invalid data: unknown partition column");
    }
}
