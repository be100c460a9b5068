use std::fmt;

use songlake_core::storage::{Result, StorageError};

/// A bucket plus an optional key prefix, parsed from `s3://bucket/prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRoot {
    pub bucket: String,
    pub prefix: String,
}

impl ObjectRoot {
    /// Parses an `s3://` or `s3a://` URL. Trailing slashes are ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("s3://")
            .or_else(|| url.strip_prefix("s3a://"))
            .ok_or_else(|| {
                StorageError::ConnectionFailed(format!("{url} is not an s3:// URL"))
            })?;

        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(StorageError::ConnectionFailed(format!(
                "{url} does not name a bucket"
            )));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }

    /// Object key for a path relative to the root.
    pub fn key(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if self.prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{relative}", self.prefix)
        }
    }

    /// Key prefix that lists everything below a relative directory.
    pub fn dir_prefix(&self, relative: &str) -> String {
        format!("{}/", self.key(relative.trim_end_matches('/')))
    }

    /// Inverse of [`ObjectRoot::key`].
    pub fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            Some(key)
        } else {
            key.strip_prefix(self.prefix.as_str())?.strip_prefix('/')
        }
    }
}

impl fmt::Display for ObjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}
