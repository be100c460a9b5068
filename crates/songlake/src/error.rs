use songlake_core::{
    storage::{SourceLayout, StorageError, TableId},
    table::TableError,
    transform::TransformError,
};
use thiserror::Error;

/// Failure while turning source files into typed records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] StorageError),
    #[error("Malformed record in {path} at line {line}: {message}")]
    Malformed {
        path: String,
        line: usize,
        message: String,
    },
}

/// A pipeline stage failed. The whole run stops at the first one.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to ingest {layout}: {source}")]
    Ingest {
        layout: SourceLayout,
        #[source]
        source: IngestError,
    },
    #[error("Failed to write table {table}: {source}")]
    Write {
        table: TableId,
        #[source]
        source: StorageError,
    },
    #[error("Failed to read table {table}: {source}")]
    Read {
        table: TableId,
        #[source]
        source: StorageError,
    },
    #[error("Table {table} does not have the expected shape: {source}")]
    Decode {
        table: TableId,
        #[source]
        source: TableError,
    },
    #[error(transparent)]
    Transform(#[from] TransformError),
}
