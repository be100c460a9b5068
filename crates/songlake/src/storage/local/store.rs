//! Parquet table store on the local filesystem.

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use walkdir::WalkDir;

use songlake_core::storage::{
    split_partitions, Result, StorageError, TableReader, TableWriter, WriteMode, WriteSummary,
};
use songlake_core::table::{Schema, Table};

use super::error::{map_io_error, map_join_error, map_walk_error};
use crate::storage::{assemble, codec, restore_partition, summarize, DATA_FILE, SUCCESS_MARKER};

/// Filesystem-backed store rooted at a directory.
///
/// A table at `location` is a directory holding one `part-00000.parquet` per
/// partition directory plus a `_SUCCESS` marker. Writes are staged in a
/// sibling directory and renamed into place, so readers see either the old
/// table or the new one.
#[derive(Debug, Clone)]
pub struct LocalParquetStore {
    root: PathBuf,
}

impl LocalParquetStore {
    /// Creates a store over `root`. The directory does not need to exist yet.
    pub fn new(root: impl AsRef<str>) -> Result<Self> {
        let root = root.as_ref();
        if root.is_empty() {
            return Err(StorageError::ConnectionFailed(
                "Storage root is empty".to_string(),
            ));
        }
        if root.contains("://") {
            return Err(StorageError::ConnectionFailed(format!(
                "{root} is not a local path; build with the 's3' feature for object storage"
            )));
        }
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative location under the root.
    pub(super) fn resolve(&self, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location);
        let is_plain = !location.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidData(format!(
                "Invalid storage location: {location}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TableWriter for LocalParquetStore {
    async fn write(
        &self,
        table: &Table,
        location: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteSummary> {
        let target = self.resolve(location)?;
        let partitions = split_partitions(table, partition_by)?;
        let summary = summarize(location, &partitions);

        let files = partitions
            .iter()
            .map(|(dir, part)| Ok((dir.clone(), codec::encode(part)?)))
            .collect::<Result<Vec<_>>>()?;

        let location = location.to_string();
        tokio::task::spawn_blocking(move || write_table(&target, &location, files, mode))
            .await
            .map_err(map_join_error)??;

        tracing::debug!(
            location = %summary.location,
            rows = summary.rows,
            files = summary.files,
            "Wrote local table"
        );

        Ok(summary)
    }
}

#[async_trait]
impl TableReader for LocalParquetStore {
    async fn read(&self, location: &str, schema: Schema) -> Result<Table> {
        let target = self.resolve(location)?;
        let location = location.to_string();
        tokio::task::spawn_blocking(move || read_table(&target, &location, schema))
            .await
            .map_err(map_join_error)?
    }
}

fn staging_dir(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.staging"))
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

fn write_table(
    target: &Path,
    location: &str,
    files: Vec<(String, Bytes)>,
    mode: WriteMode,
) -> Result<()> {
    if mode == WriteMode::ErrorIfExists && target.exists() {
        return Err(StorageError::AlreadyExists {
            location: location.to_string(),
        });
    }

    let staging = staging_dir(target);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| map_io_error(e, location))?;
    }
    fs::create_dir_all(&staging).map_err(|e| map_io_error(e, location))?;

    for (dir, bytes) in files {
        let partition_dir = join_relative(&staging, &dir);
        fs::create_dir_all(&partition_dir).map_err(|e| map_io_error(e, location))?;
        fs::write(partition_dir.join(DATA_FILE), &bytes).map_err(|e| map_io_error(e, location))?;
    }
    fs::write(staging.join(SUCCESS_MARKER), b"").map_err(|e| map_io_error(e, location))?;

    if target.exists() {
        fs::remove_dir_all(target).map_err(|e| map_io_error(e, location))?;
    }
    fs::rename(&staging, target).map_err(|e| map_io_error(e, location))
}

fn is_data_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| name.starts_with('.') || name.starts_with('_'));
    !hidden && path.extension().is_some_and(|ext| ext == "parquet")
}

fn relative_dir(root: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|relative| {
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn read_table(target: &Path, location: &str, schema: Schema) -> Result<Table> {
    if !target.is_dir() {
        return Err(StorageError::NotFound {
            location: location.to_string(),
        });
    }

    let mut rows = Vec::new();
    for entry in WalkDir::new(target).sort_by_file_name() {
        let entry = entry.map_err(|e| map_walk_error(e, location))?;
        if !entry.file_type().is_file() || !is_data_file(entry.path()) {
            continue;
        }
        let partition_dir = relative_dir(target, entry.path());
        let bytes = fs::read(entry.path()).map_err(|e| map_io_error(e, location))?;
        rows.extend(restore_partition(schema, &partition_dir, |columns| {
            codec::decode(Bytes::from(bytes), columns)
        })?);
    }

    assemble(schema, rows)
}
