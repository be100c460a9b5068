use chrono::NaiveDateTime;

use super::error::{Result, TableError};
use super::types::{Column, Schema, Value};

/// A typed row that can be converted to and from untyped values.
pub trait TableRow: Sized {
    /// Columns in the order `to_values` emits them.
    fn schema() -> Schema;

    fn to_values(&self) -> Vec<Value>;

    fn from_values(values: Vec<Value>) -> Result<Self>;
}

/// Conversion from a single cell into a Rust value.
///
/// Returns `None` when the cell has the wrong type (or is null for a
/// non-optional target).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int32(n) => Some(n),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int64(n) => Some(n),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float64(n) => Some(n),
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }
}

/// Reads the values of one row field by field, in schema order.
pub struct FieldReader {
    schema: Schema,
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl FieldReader {
    pub fn new(schema: Schema, values: Vec<Value>) -> Result<Self> {
        if schema.len() != values.len() {
            return Err(TableError::ArityMismatch {
                expected: schema.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            schema,
            values: values.into_iter(),
            position: 0,
        })
    }

    /// Takes the next field, converting it to `T`.
    pub fn next<T: FromValue>(&mut self) -> Result<T> {
        let column: &Column =
            self.schema
                .get(self.position)
                .ok_or(TableError::ArityMismatch {
                    expected: self.schema.len(),
                    found: self.position + 1,
                })?;
        let value = self.values.next().ok_or(TableError::ArityMismatch {
            expected: self.schema.len(),
            found: self.position,
        })?;
        self.position += 1;

        let found = value.type_name();
        T::from_value(value).ok_or_else(|| TableError::TypeMismatch {
            column: column.name.to_string(),
            expected: column.kind.to_string(),
            found,
        })
    }
}
