//! S3 table store and record source.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;

use songlake_core::storage::{
    split_partitions, RecordSource, Result, SourceLayout, StorageError, TableReader, TableWriter,
    WriteMode, WriteSummary,
};
use songlake_core::table::{Schema, Table};

use super::error::{
    map_build_error, map_delete_objects_error, map_get_object_error, map_list_error,
    map_put_object_error,
};
use super::location::ObjectRoot;
use crate::config::AwsSettings;
use crate::storage::{assemble, codec, restore_partition, summarize, DATA_FILE, SUCCESS_MARKER};

/// DeleteObjects accepts at most this many keys per request.
const DELETE_BATCH: usize = 1000;

/// Builds an S3 client from explicit settings.
///
/// Credentials come from the configuration only; nothing is read from or
/// written to the process environment.
pub async fn client(settings: &AwsSettings) -> Client {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None,
        None,
        "songlake",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials);
    if let Some(endpoint) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(settings.endpoint_url.is_some())
        .build();
    Client::from_conf(s3_config)
}

/// S3-backed store rooted at `s3://bucket/prefix`.
///
/// Overwriting a table deletes every object under its prefix before the new
/// files are uploaded, so the write is not atomic: a failure part-way leaves
/// no `_SUCCESS` marker.
#[derive(Debug, Clone)]
pub struct S3ParquetStore {
    client: Client,
    root: ObjectRoot,
}

impl S3ParquetStore {
    pub fn new(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            root: ObjectRoot::parse(url)?,
        })
    }

    /// Lists every key below `prefix`, in key order.
    async fn list_keys(&self, prefix: &str, limit: Option<i32>) -> Result<Vec<String>> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.root.bucket)
            .prefix(prefix);
        if let Some(limit) = limit {
            request = request.max_keys(limit);
        }

        let mut pages = request.into_paginator().send();
        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| map_list_error(e, prefix))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
            if limit.is_some_and(|limit| keys.len() >= limit as usize) {
                break;
            }
        }
        Ok(keys)
    }

    async fn delete_keys(&self, keys: Vec<String>, prefix: &str) -> Result<()> {
        for chunk in keys.chunks(DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_build_error)?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(map_build_error)?;
            self.client
                .delete_objects()
                .bucket(&self.root.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| map_delete_objects_error(e, prefix))?;
        }
        Ok(())
    }

    async fn put(&self, key: String, body: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.root.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| map_put_object_error(e, &key))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.root.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_object_error(e, key))?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Io(format!("Reading {key} failed: {e}")))?;
        Ok(body.into_bytes())
    }
}

#[async_trait]
impl TableWriter for S3ParquetStore {
    async fn write(
        &self,
        table: &Table,
        location: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteSummary> {
        let partitions = split_partitions(table, partition_by)?;
        let summary = summarize(location, &partitions);
        let table_prefix = self.root.dir_prefix(location);

        let existing = match mode {
            WriteMode::ErrorIfExists => self.list_keys(&table_prefix, Some(1)).await?,
            WriteMode::Overwrite => self.list_keys(&table_prefix, None).await?,
        };
        if !existing.is_empty() {
            if mode == WriteMode::ErrorIfExists {
                return Err(StorageError::AlreadyExists {
                    location: location.to_string(),
                });
            }
            tracing::debug!(prefix = %table_prefix, objects = existing.len(), "Deleting previous table");
            self.delete_keys(existing, &table_prefix).await?;
        }

        for (dir, part) in &partitions {
            let relative = if dir.is_empty() {
                format!("{location}/{DATA_FILE}")
            } else {
                format!("{location}/{dir}/{DATA_FILE}")
            };
            self.put(self.root.key(&relative), codec::encode(part)?)
                .await?;
        }
        self.put(
            self.root.key(&format!("{location}/{SUCCESS_MARKER}")),
            Bytes::new(),
        )
        .await?;

        tracing::debug!(
            location = %summary.location,
            bucket = %self.root.bucket,
            rows = summary.rows,
            files = summary.files,
            "Wrote S3 table"
        );

        Ok(summary)
    }
}

#[async_trait]
impl TableReader for S3ParquetStore {
    async fn read(&self, location: &str, schema: Schema) -> Result<Table> {
        let table_prefix = self.root.dir_prefix(location);
        let keys = self.list_keys(&table_prefix, None).await?;
        if keys.is_empty() {
            return Err(StorageError::NotFound {
                location: location.to_string(),
            });
        }

        let mut rows = Vec::new();
        for key in &keys {
            let Some(relative) = key.strip_prefix(table_prefix.as_str()) else {
                continue;
            };
            let (partition_dir, file_name) = relative.rsplit_once('/').unwrap_or(("", relative));
            let hidden = file_name.starts_with('.') || file_name.starts_with('_');
            if hidden || !file_name.ends_with(".parquet") {
                continue;
            }
            let bytes = self.get(key).await?;
            rows.extend(restore_partition(schema, partition_dir, |columns| {
                codec::decode(bytes, columns)
            })?);
        }

        assemble(schema, rows)
    }
}

#[async_trait]
impl RecordSource for S3ParquetStore {
    async fn list(&self, layout: &SourceLayout) -> Result<Vec<String>> {
        let prefix = self.root.dir_prefix(layout.dir);
        let keys = self.list_keys(&prefix, None).await?;
        if keys.is_empty() {
            return Err(StorageError::NotFound {
                location: format!("s3://{}/{prefix}", self.root.bucket),
            });
        }

        let mut paths: Vec<String> = keys
            .iter()
            .filter_map(|key| self.root.relative(key))
            .filter(|relative| layout.matches(relative))
            .map(str::to_string)
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        let key = self.root.key(path);
        let bytes = self.get(&key).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| StorageError::Encoding(format!("{path}: {e}")))
    }
}
