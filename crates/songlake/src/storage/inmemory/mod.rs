//! In-memory storage backend for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use songlake_core::storage::{
    split_partitions, RecordSource, Result, SourceLayout, StorageError, TableReader, TableWriter,
    WriteMode, WriteSummary,
};
use songlake_core::table::{Schema, Table, Value};

use crate::storage::{assemble, restore_partition, summarize};

/// Source files and written tables held in memory.
///
/// Tables are kept split by partition path, the way a file-based backend
/// lays them out, so reads exercise the same partition restoration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    sources: Arc<RwLock<BTreeMap<String, String>>>,
    tables: Arc<RwLock<HashMap<String, BTreeMap<String, Table>>>>,
    read_failure: Arc<RwLock<Option<StorageError>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source file at `path`, relative to the source root.
    pub async fn insert_source(&self, path: &str, content: &str) {
        self.sources
            .write()
            .await
            .insert(path.to_string(), content.to_string());
    }

    /// Makes every subsequent source read fail with `error`.
    pub async fn fail_reads_with(&self, error: StorageError) {
        *self.read_failure.write().await = Some(error);
    }

    /// Partition paths written for the table at `location`.
    pub async fn partitions(&self, location: &str) -> Vec<String> {
        self.tables
            .read()
            .await
            .get(location)
            .map(|parts| parts.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Data stored under one partition path, without its partition columns.
    pub async fn partition(&self, location: &str, path: &str) -> Option<Table> {
        self.tables
            .read()
            .await
            .get(location)
            .and_then(|parts| parts.get(path).cloned())
    }
}

#[async_trait]
impl RecordSource for InMemoryStore {
    async fn list(&self, layout: &SourceLayout) -> Result<Vec<String>> {
        let sources = self.sources.read().await;
        let prefix = format!("{}/", layout.dir);
        if !sources.keys().any(|path| path.starts_with(&prefix)) {
            return Err(StorageError::NotFound {
                location: layout.dir.to_string(),
            });
        }
        Ok(sources
            .keys()
            .filter(|path| layout.matches(path))
            .cloned()
            .collect())
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        if let Some(error) = self.read_failure.read().await.clone() {
            return Err(error);
        }
        self.sources
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                location: path.to_string(),
            })
    }
}

#[async_trait]
impl TableWriter for InMemoryStore {
    async fn write(
        &self,
        table: &Table,
        location: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteSummary> {
        let partitions = split_partitions(table, partition_by)?;
        let summary = summarize(location, &partitions);

        let mut tables = self.tables.write().await;
        if mode == WriteMode::ErrorIfExists && tables.contains_key(location) {
            return Err(StorageError::AlreadyExists {
                location: location.to_string(),
            });
        }
        tables.insert(location.to_string(), partitions);

        Ok(summary)
    }
}

#[async_trait]
impl TableReader for InMemoryStore {
    async fn read(&self, location: &str, schema: Schema) -> Result<Table> {
        let tables = self.tables.read().await;
        let parts = tables.get(location).ok_or_else(|| StorageError::NotFound {
            location: location.to_string(),
        })?;

        let mut rows = Vec::new();
        for (path, stored) in parts {
            rows.extend(restore_partition(schema, path, |columns| {
                project(stored, columns.iter().map(|column| column.name))
            })?);
        }
        assemble(schema, rows)
    }
}

fn project<'a>(
    table: &Table,
    names: impl Iterator<Item = &'a str>,
) -> Result<Vec<Vec<Value>>> {
    let indices = names
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| StorageError::InvalidData(format!("Missing column: {name}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|index| row[*index].clone()).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use songlake_core::records::{TimeRow, TIME_SCHEMA};
    use songlake_core::storage::TableId;
    use songlake_core::transform::{epoch_millis_to_timestamp, time_row};

    fn time_table() -> Table {
        let rows: Vec<TimeRow> = [1541105830796, 1542241826796, 1546300800000]
            .into_iter()
            .map(|ms| time_row(epoch_millis_to_timestamp(ms).unwrap()))
            .collect();
        Table::from_rows(&rows)
    }

    #[tokio::test]
    async fn test_write_records_partitions_and_reads_back() {
        let store = InMemoryStore::new();
        let id = TableId::Time;
        let table = time_table();

        store
            .write(&table, id.location(), id.partition_by(), WriteMode::Overwrite)
            .await
            .unwrap();
        assert_eq!(
            store.partitions(id.location()).await,
            vec!["year=2018/month=11".to_string(), "year=2019/month=1".to_string()]
        );

        let read = store.read(id.location(), TIME_SCHEMA).await.unwrap();
        assert_eq!(read, table);
    }

    #[tokio::test]
    async fn test_error_if_exists() {
        let store = InMemoryStore::new();
        store
            .write(&time_table(), "time", &[], WriteMode::ErrorIfExists)
            .await
            .unwrap();
        let result = store
            .write(&time_table(), "time", &[], WriteMode::ErrorIfExists)
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_list_filters_by_layout() {
        let store = InMemoryStore::new();
        store.insert_source("log_data/2018/11/b.json", "").await;
        store.insert_source("log_data/2018/11/a.json", "").await;
        store.insert_source("log_data/2018/a.json", "").await;

        let paths = store.list(&SourceLayout::LOG_DATA).await.unwrap();
        assert_eq!(paths, vec!["log_data/2018/11/a.json", "log_data/2018/11/b.json"]);
        assert!(matches!(
            store.list(&SourceLayout::SONG_DATA).await,
            Err(StorageError::NotFound { .. })
        ));
    }
}
