mod dedup;
mod error;
mod row;
mod types;

pub use dedup::dedup_rows;
pub use error::{Result, TableError};
pub use row::{FieldReader, FromValue, TableRow};
pub use types::{Column, ColumnType, Schema, Table, Value};
