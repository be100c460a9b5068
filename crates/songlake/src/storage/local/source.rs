//! Source file discovery on the local filesystem.

use async_trait::async_trait;
use walkdir::WalkDir;

use songlake_core::storage::{RecordSource, Result, SourceLayout, StorageError};

use super::error::{map_io_error, map_join_error, map_walk_error};
use super::store::LocalParquetStore;

#[async_trait]
impl RecordSource for LocalParquetStore {
    async fn list(&self, layout: &SourceLayout) -> Result<Vec<String>> {
        let root = self.root().to_path_buf();
        let layout = *layout;

        tokio::task::spawn_blocking(move || {
            let base = root.join(layout.dir);
            if !base.is_dir() {
                return Err(StorageError::NotFound {
                    location: base.display().to_string(),
                });
            }

            let mut paths = Vec::new();
            for entry in WalkDir::new(&base).min_depth(1).max_depth(layout.depth) {
                let entry = entry.map_err(|e| map_walk_error(e, layout.dir))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&root) else {
                    continue;
                };
                let relative = relative
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if layout.matches(&relative) {
                    paths.push(relative);
                }
            }
            paths.sort();
            Ok(paths)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| map_io_error(e, path))
    }
}
