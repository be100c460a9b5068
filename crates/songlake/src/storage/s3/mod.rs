//! S3 storage backend implementation.
//!
//! Tables are written as Parquet objects under a bucket prefix using
//! `aws-sdk-s3`. The same store lists and reads source files.

mod error;
mod location;
mod store;

pub use store::{client, S3ParquetStore};
