//! Parquet encoding for tables.
//!
//! A table becomes a single Arrow record batch written as one Parquet file
//! with snappy compression. Timestamps are stored as microseconds without a
//! time zone.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use songlake_core::{
    storage::{Result, StorageError},
    table::{Column, ColumnType, Table, Value},
};

fn data_type(kind: ColumnType) -> DataType {
    match kind {
        ColumnType::Int32 => DataType::Int32,
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Utf8 => DataType::Utf8,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

fn arrow_schema(columns: &[Column]) -> Arc<Schema> {
    Arc::new(Schema::new(
        columns
            .iter()
            .map(|column| Field::new(column.name, data_type(column.kind), column.nullable))
            .collect::<Vec<_>>(),
    ))
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Encodes a table as Parquet bytes.
///
/// The same table always produces the same bytes.
pub fn encode(table: &Table) -> Result<Bytes> {
    let schema = arrow_schema(table.schema());
    let arrays = table
        .schema()
        .iter()
        .enumerate()
        .map(|(index, column)| column_array(table, index, column))
        .collect::<Result<Vec<_>>>()?;

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| StorageError::Encoding(format!("record batch build failed: {e}")))?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(writer_properties()))
        .map_err(|e| StorageError::Encoding(format!("parquet writer init failed: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| StorageError::Encoding(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| StorageError::Encoding(format!("parquet close failed: {e}")))?;

    Ok(Bytes::from(buffer))
}

fn column_array(table: &Table, index: usize, column: &Column) -> Result<ArrayRef> {
    let values = table.rows().iter().map(|row| &row[index]);

    let array: ArrayRef = match column.kind {
        ColumnType::Int32 => Arc::new(Int32Array::from(
            values
                .map(|value| match value {
                    Value::Int32(n) => Ok(Some(*n)),
                    other => null_or_mismatch(column, other),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Int64 => Arc::new(Int64Array::from(
            values
                .map(|value| match value {
                    Value::Int64(n) => Ok(Some(*n)),
                    other => null_or_mismatch(column, other),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Float64 => Arc::new(Float64Array::from(
            values
                .map(|value| match value {
                    Value::Float64(n) => Ok(Some(*n)),
                    other => null_or_mismatch(column, other),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Utf8 => Arc::new(StringArray::from(
            values
                .map(|value| match value {
                    Value::Utf8(s) => Ok(Some(s.as_str())),
                    other => null_or_mismatch(column, other),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        ColumnType::Timestamp => Arc::new(TimestampMicrosecondArray::from(
            values
                .map(|value| match value {
                    Value::Timestamp(ts) => Ok(Some(ts.and_utc().timestamp_micros())),
                    other => null_or_mismatch(column, other),
                })
                .collect::<Result<Vec<_>>>()?,
        )),
    };

    Ok(array)
}

fn null_or_mismatch<T>(column: &Column, value: &Value) -> Result<Option<T>> {
    match value {
        Value::Null => Ok(None),
        other => Err(StorageError::Encoding(format!(
            "column {} holds {}, expected {}",
            column.name,
            other.type_name(),
            column.kind
        ))),
    }
}

/// Decodes Parquet bytes into rows holding `columns`, in that order.
///
/// Columns are looked up by name. The file may hold extra columns.
pub fn decode(bytes: Bytes, columns: &[Column]) -> Result<Vec<Vec<Value>>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| StorageError::Encoding(format!("parquet reader init failed: {e}")))?
        .build()
        .map_err(|e| StorageError::Encoding(format!("parquet reader build failed: {e}")))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| StorageError::Encoding(format!("parquet read batch failed: {e}")))?;

        let mut batch_rows: Vec<Vec<Value>> = (0..batch.num_rows())
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for column in columns {
            let index = batch.schema().index_of(column.name).map_err(|_| {
                StorageError::InvalidData(format!("Missing column: {}", column.name))
            })?;
            let values = column_values(batch.column(index), column)?;
            for (row, value) in batch_rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        rows.extend(batch_rows);
    }

    Ok(rows)
}

fn typed<'a, A: Array + 'static>(array: &'a ArrayRef, column: &Column) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        StorageError::InvalidData(format!(
            "column {} is stored as {}, expected {}",
            column.name,
            array.data_type(),
            column.kind
        ))
    })
}

fn column_values(array: &ArrayRef, column: &Column) -> Result<Vec<Value>> {
    let len = array.len();
    let present = |i: usize| !array.is_null(i);

    let values = match column.kind {
        ColumnType::Int32 => {
            let a = typed::<Int32Array>(array, column)?;
            (0..len)
                .map(|i| present(i).then(|| Value::Int32(a.value(i))).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Int64 => {
            let a = typed::<Int64Array>(array, column)?;
            (0..len)
                .map(|i| present(i).then(|| Value::Int64(a.value(i))).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Float64 => {
            let a = typed::<Float64Array>(array, column)?;
            (0..len)
                .map(|i| present(i).then(|| Value::Float64(a.value(i))).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Utf8 => {
            let a = typed::<StringArray>(array, column)?;
            (0..len)
                .map(|i| {
                    present(i)
                        .then(|| Value::Utf8(a.value(i).to_string()))
                        .unwrap_or(Value::Null)
                })
                .collect()
        }
        ColumnType::Timestamp => {
            let a = typed::<TimestampMicrosecondArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if !present(i) {
                        return Ok(Value::Null);
                    }
                    micros_to_timestamp(a.value(i)).map(Value::Timestamp)
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(values)
}

fn micros_to_timestamp(micros: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| StorageError::InvalidData(format!("timestamp out of range: {micros}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PLAYS: &[Column] = &[
        Column::required("start_time", ColumnType::Timestamp),
        Column::nullable("user_id", ColumnType::Utf8),
        Column::required("session_id", ColumnType::Int64),
        Column::nullable("length", ColumnType::Float64),
        Column::required("month", ColumnType::Int32),
    ];

    fn table() -> Table {
        let start = NaiveDate::from_ymd_opt(2018, 11, 15)
            .unwrap()
            .and_hms_milli_opt(0, 30, 26, 796)
            .unwrap();
        Table::new(
            PLAYS.to_vec(),
            vec![
                vec![
                    Value::Timestamp(start),
                    Value::Utf8("8".into()),
                    Value::Int64(139),
                    Value::Float64(246.30812),
                    Value::Int32(11),
                ],
                vec![
                    Value::Timestamp(start),
                    Value::Null,
                    Value::Int64(52),
                    Value::Null,
                    Value::Int32(11),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_then_decode_preserves_values_and_nulls() {
        let table = table();
        let bytes = encode(&table).unwrap();
        let rows = decode(bytes, PLAYS).unwrap();
        assert_eq!(rows, table.rows());
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode(&table()).unwrap(), encode(&table()).unwrap());
    }

    #[test]
    fn test_decode_projects_columns_by_name() {
        let bytes = encode(&table()).unwrap();
        let projection = [
            Column::required("session_id", ColumnType::Int64),
            Column::nullable("user_id", ColumnType::Utf8),
        ];
        let rows = decode(bytes, &projection).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Int64(139), Value::Utf8("8".into())],
                vec![Value::Int64(52), Value::Null],
            ]
        );
    }

    #[test]
    fn test_decode_missing_column() {
        let bytes = encode(&table()).unwrap();
        let projection = [Column::required("song_id", ColumnType::Utf8)];
        assert_eq!(
            decode(bytes, &projection),
            Err(StorageError::InvalidData("Missing column: song_id".to_string()))
        );
    }

    #[test]
    fn test_decode_type_mismatch() {
        let bytes = encode(&table()).unwrap();
        let projection = [Column::required("session_id", ColumnType::Utf8)];
        assert!(matches!(
            decode(bytes, &projection),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_table_round_trips() {
        let bytes = encode(&Table::empty(PLAYS.to_vec())).unwrap();
        assert!(decode(bytes, PLAYS).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode(Bytes::from_static(b"not parquet"), PLAYS);
        assert!(matches!(result, Err(StorageError::Encoding(_))));
    }
}
