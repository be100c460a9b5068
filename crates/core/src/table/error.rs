use thiserror::Error;

/// Errors that can occur when building or decoding tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Row has {found} values but the schema has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },
    #[error("Column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Schema mismatch: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
