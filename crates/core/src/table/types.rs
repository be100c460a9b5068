use std::fmt;

use chrono::NaiveDateTime;

use super::error::{Result, TableError};
use super::row::TableRow;

/// Physical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int32,
    Int64,
    Float64,
    Utf8,
    /// Microsecond precision, no time zone attached.
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Utf8 => "utf8",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// A column that never holds nulls.
    pub const fn required(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// A column that may hold nulls.
    pub const fn nullable(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Static column list describing a row type.
pub type Schema = &'static [Column];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// The column type this value belongs to, `None` for nulls.
    pub fn kind(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Int32(_) => Some(ColumnType::Int32),
            Value::Int64(_) => Some(ColumnType::Int64),
            Value::Float64(_) => Some(ColumnType::Float64),
            Value::Utf8(_) => Some(ColumnType::Utf8),
            Value::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    /// Human readable type name used in error messages.
    pub fn type_name(&self) -> String {
        self.kind()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "null".to_string())
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Utf8).unwrap_or(Value::Null)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map(Value::Float64).unwrap_or(Value::Null)
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        value.map(Value::Int64).unwrap_or(Value::Null)
    }
}

/// An immutable, schema-checked set of rows.
///
/// This is the shape tables take when they cross the storage seam. Builders
/// work on typed rows and convert at the boundary with [`Table::from_rows`]
/// and [`Table::into_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a table, checking every row against the schema.
    pub fn new(schema: Vec<Column>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for row in &rows {
            check_row(&schema, row)?;
        }
        Ok(Self { schema, rows })
    }

    /// Creates a table from rows already known to match the schema.
    pub(crate) fn from_parts(schema: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// An empty table with the given schema.
    pub fn empty(schema: Vec<Column>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Converts typed rows into a table.
    pub fn from_rows<R: TableRow>(rows: &[R]) -> Self {
        Self {
            schema: R::schema().to_vec(),
            rows: rows.iter().map(TableRow::to_values).collect(),
        }
    }

    /// Converts the table back into typed rows.
    ///
    /// The table's columns must match the row type's schema by name and order.
    pub fn into_rows<R: TableRow>(self) -> Result<Vec<R>> {
        let expected = R::schema();
        let same_columns = expected.len() == self.schema.len()
            && expected
                .iter()
                .zip(&self.schema)
                .all(|(a, b)| a.name == b.name && a.kind == b.kind);
        if !same_columns {
            return Err(TableError::SchemaMismatch {
                expected: column_names(expected),
                found: column_names(&self.schema),
            });
        }
        self.rows.into_iter().map(R::from_values).collect()
    }

    pub fn schema(&self) -> &[Column] {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|column| column.name == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }
}

fn check_row(schema: &[Column], row: &[Value]) -> Result<()> {
    if schema.len() != row.len() {
        return Err(TableError::ArityMismatch {
            expected: schema.len(),
            found: row.len(),
        });
    }
    for (column, value) in schema.iter().zip(row) {
        let valid = match value.kind() {
            None => column.nullable,
            Some(kind) => kind == column.kind,
        };
        if !valid {
            return Err(TableError::TypeMismatch {
                column: column.name.to_string(),
                expected: column.kind.to_string(),
                found: value.type_name(),
            });
        }
    }
    Ok(())
}

fn column_names(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[Column] = &[
        Column::required("id", ColumnType::Utf8),
        Column::nullable("score", ColumnType::Float64),
    ];

    #[test]
    fn test_new_accepts_matching_rows() {
        let table = Table::new(
            SCHEMA.to_vec(),
            vec![
                vec![Value::Utf8("a".into()), Value::Float64(1.5)],
                vec![Value::Utf8("b".into()), Value::Null],
            ],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("score"), Some(1));
    }

    #[test]
    fn test_new_rejects_null_in_required_column() {
        let result = Table::new(SCHEMA.to_vec(), vec![vec![Value::Null, Value::Null]]);
        assert_eq!(
            result,
            Err(TableError::TypeMismatch {
                column: "id".to_string(),
                expected: "utf8".to_string(),
                found: "null".to_string(),
            })
        );
    }

    #[test]
    fn test_new_rejects_wrong_type() {
        let result = Table::new(
            SCHEMA.to_vec(),
            vec![vec![Value::Utf8("a".into()), Value::Int64(3)]],
        );
        assert!(matches!(result, Err(TableError::TypeMismatch { .. })));
    }

    #[test]
    fn test_new_rejects_short_row() {
        let result = Table::new(SCHEMA.to_vec(), vec![vec![Value::Utf8("a".into())]]);
        assert_eq!(
            result,
            Err(TableError::ArityMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_column_values() {
        let table = Table::new(
            SCHEMA.to_vec(),
            vec![
                vec![Value::Utf8("a".into()), Value::Float64(1.5)],
                vec![Value::Utf8("b".into()), Value::Null],
            ],
        )
        .unwrap();
        let scores = table.column_values("score").unwrap();
        assert_eq!(scores, vec![&Value::Float64(1.5), &Value::Null]);
        assert!(table.column_values("missing").is_err());
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Null.kind(), None);
        assert_eq!(Value::Int32(1).kind(), Some(ColumnType::Int32));
        assert_eq!(Value::Utf8("x".into()).type_name(), "utf8");
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(2.0)), Value::Float64(2.0));
    }
}
