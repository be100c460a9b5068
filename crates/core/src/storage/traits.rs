use async_trait::async_trait;

use crate::table::{Schema, Table};

use super::{Result, SourceLayout, WriteMode, WriteSummary};

/// Persists whole tables.
#[async_trait]
pub trait TableWriter: Send + Sync {
    /// Writes `table` under `location`, split into one directory per distinct
    /// combination of `partition_by` values.
    ///
    /// A write either replaces the whole table or leaves the previous contents
    /// in place.
    async fn write(
        &self,
        table: &Table,
        location: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteSummary>;
}

/// Reads whole tables back.
#[async_trait]
pub trait TableReader: Send + Sync {
    /// Reads the table stored under `location`.
    ///
    /// Columns come back in `schema` order, with partition columns restored
    /// from the partition paths.
    async fn read(&self, location: &str, schema: Schema) -> Result<Table>;
}

/// Lists and reads raw source files.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns the paths matching `layout`, relative to the source root and
    /// sorted.
    async fn list(&self, layout: &SourceLayout) -> Result<Vec<String>>;

    /// Reads one source file.
    async fn read_to_string(&self, path: &str) -> Result<String>;
}
