use std::collections::HashSet;

use chrono::NaiveDateTime;

use super::row::TableRow;
use super::types::Value;

/// Hashable image of a value. Floats compare by bit pattern with `-0.0`
/// folded into `0.0`.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ValueKey {
    Null,
    Int32(i32),
    Int64(i64),
    Float64(u64),
    Utf8(String),
    Timestamp(NaiveDateTime),
}

impl From<Value> for ValueKey {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Int32(n) => ValueKey::Int32(n),
            Value::Int64(n) => ValueKey::Int64(n),
            Value::Float64(n) if n == 0.0 => ValueKey::Float64(0.0f64.to_bits()),
            Value::Float64(n) => ValueKey::Float64(n.to_bits()),
            Value::Utf8(s) => ValueKey::Utf8(s),
            Value::Timestamp(ts) => ValueKey::Timestamp(ts),
        }
    }
}

/// Removes rows that are identical across every column.
///
/// The first occurrence of each row is kept and input order is preserved, so
/// the output is deterministic for a given input.
pub fn dedup_rows<R: TableRow>(rows: Vec<R>) -> Vec<R> {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| {
            let key = row.to_values().into_iter().map(ValueKey::from).collect();
            seen.insert(key)
        })
        .collect()
}
