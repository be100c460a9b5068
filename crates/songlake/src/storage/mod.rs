//! Storage backend implementations.
//!
//! Concrete implementations of the `RecordSource`, `TableWriter` and
//! `TableReader` traits from `songlake_core::storage`. Tables are stored as
//! Hive-style partitioned Parquet directories. The backend is selected at
//! compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `local` (default): local filesystem, source files discovered with `walkdir`
//! - `s3`: Amazon S3 (or a compatible endpoint) using `aws-sdk-s3`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with the local filesystem backend (default):
//! ```bash
//! cargo build -p songlake
//! ```
//!
//! Build with S3:
//! ```bash
//! cargo build -p songlake --no-default-features --features s3
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "local", feature = "s3"))]
compile_error!(
    "Features 'local' and 's3' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "local", feature = "s3")))]
compile_error!(
    "No storage backend selected. Enable 'local' or 's3' feature. \
    Example: cargo build -p songlake --features local"
);

use std::sync::Arc;

use songlake_core::{
    storage::{
        data_columns, merge_partition_values, parse_partition_path, RecordSource, Result,
        StorageError, TableReader, TableWriter, WriteSummary,
    },
    table::{Column, Schema, Table, Value},
};

use crate::config::Config;

pub mod codec;

#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "s3")]
pub mod s3;

#[cfg(test)]
pub mod inmemory;

/// Name of the single data file written into each partition directory.
pub const DATA_FILE: &str = "part-00000.parquet";

/// Marker written next to the data once a table is complete.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// The three storage roles the pipeline needs.
pub struct Backends {
    pub source: Arc<dyn RecordSource>,
    pub writer: Arc<dyn TableWriter>,
    pub reader: Arc<dyn TableReader>,
}

/// Opens the configured backend for the input and output roots.
#[cfg(feature = "local")]
pub async fn connect(config: &Config) -> Result<Backends> {
    let source = local::LocalParquetStore::new(&config.input_root)?;
    let store = Arc::new(local::LocalParquetStore::new(&config.output_root)?);

    tracing::info!(
        input = %config.input_root,
        output = %config.output_root,
        "Using local filesystem storage"
    );

    Ok(Backends {
        source: Arc::new(source),
        writer: store.clone(),
        reader: store,
    })
}

/// Opens the configured backend for the input and output roots.
#[cfg(feature = "s3")]
pub async fn connect(config: &Config) -> Result<Backends> {
    let aws = config.aws.as_ref().ok_or_else(|| {
        StorageError::ConnectionFailed("No AWS credentials configured".to_string())
    })?;
    let client = s3::client(aws).await;
    let source = s3::S3ParquetStore::new(client.clone(), &config.input_root)?;
    let store = Arc::new(s3::S3ParquetStore::new(client, &config.output_root)?);

    tracing::info!(
        input = %config.input_root,
        output = %config.output_root,
        region = %aws.region,
        "Using S3 storage"
    );

    Ok(Backends {
        source: Arc::new(source),
        writer: store.clone(),
        reader: store,
    })
}

/// Counts what a write produced from its split partitions.
pub(crate) fn summarize<'a>(
    location: &str,
    partitions: impl IntoIterator<Item = (&'a String, &'a Table)>,
) -> WriteSummary {
    let mut summary = WriteSummary {
        location: location.to_string(),
        ..Default::default()
    };
    for (path, table) in partitions {
        summary.rows += table.len();
        summary.files += 1;
        if !path.is_empty() {
            summary.partitions += 1;
        }
    }
    summary
}

/// Rebuilds full rows for one data file found under `partition_dir`.
///
/// `decode` receives the columns stored in the file itself, in schema order.
pub(crate) fn restore_partition<F>(
    schema: Schema,
    partition_dir: &str,
    decode: F,
) -> Result<Vec<Vec<Value>>>
where
    F: FnOnce(&[Column]) -> Result<Vec<Vec<Value>>>,
{
    let partition = parse_partition_path(partition_dir, schema)?;
    let columns = data_columns(schema, &partition);
    let rows = decode(&columns)?;
    merge_partition_values(schema, &columns, rows, &partition)
}

/// Validates assembled rows against the requested schema.
pub(crate) fn assemble(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Table> {
    Table::new(schema.to_vec(), rows).map_err(|e| StorageError::InvalidData(e.to_string()))
}
