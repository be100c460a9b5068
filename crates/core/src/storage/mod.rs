mod error;
mod partition;
mod traits;
mod types;

pub use error::{Result, StorageError};
pub use partition::{
    data_columns, merge_partition_values, parse_partition_path, partition_path, split_partitions,
    DEFAULT_PARTITION,
};
pub use traits::{RecordSource, TableReader, TableWriter};
pub use types::{SourceLayout, TableId, WriteMode, WriteSummary};
