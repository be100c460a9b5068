//! Reads newline-delimited JSON source files into typed records.

use serde::de::DeserializeOwned;
use songlake_core::storage::{RecordSource, SourceLayout};

use crate::error::IngestError;

/// Reads every file the source lists for `layout`.
///
/// Each non-blank line is one JSON object. The first line that does not
/// deserialize aborts the read.
pub async fn ingest<T>(source: &dyn RecordSource, layout: &SourceLayout) -> Result<Vec<T>, IngestError>
where
    T: DeserializeOwned,
{
    let paths = source.list(layout).await?;
    let mut records = Vec::new();

    for path in &paths {
        let content = source.read_to_string(path).await?;
        let parsed = parse_lines::<T>(path, &content)?;
        tracing::debug!(path = %path, records = parsed.len(), "Read source file");
        records.extend(parsed);
    }

    tracing::info!(
        layout = %layout,
        files = paths.len(),
        records = records.len(),
        "Ingested source records"
    );

    Ok(records)
}

/// Parses one file's content. Line numbers in errors are 1-based.
pub fn parse_lines<T>(path: &str, content: &str) -> Result<Vec<T>, IngestError>
where
    T: DeserializeOwned,
{
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| IngestError::Malformed {
                path: path.to_string(),
                line: index + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
