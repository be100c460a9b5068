//! Local filesystem storage backend.
//!
//! Tables are written as directories of Parquet files under an output root;
//! source files are discovered by walking an input root.

mod error;
mod source;
mod store;

pub use store::LocalParquetStore;
