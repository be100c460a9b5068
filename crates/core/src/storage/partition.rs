//! Hive-style partition layout.
//!
//! A partitioned table is a directory tree with one `<column>=<value>` level
//! per partition column. Partition columns are dropped from the data files and
//! restored from the path on read.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::table::{Column, ColumnType, Table, Value};

use super::{Result, StorageError};

/// Directory value used for null partition values.
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Builds the relative directory for one combination of partition values.
pub fn partition_path(segments: &[(&str, &Value)]) -> String {
    segments
        .iter()
        .map(|(column, value)| format!("{column}={}", format_value(value)))
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a table into one sub-table per distinct partition path.
///
/// Partition columns are removed from the sub-tables. With no partition
/// columns the whole table is returned under the empty path. Keys are ordered
/// so callers write partitions in a stable order.
pub fn split_partitions(table: &Table, partition_by: &[&str]) -> Result<BTreeMap<String, Table>> {
    let mut partition_indices = Vec::with_capacity(partition_by.len());
    for name in partition_by {
        let index = table.column_index(name).ok_or_else(|| {
            StorageError::InvalidData(format!("Unknown partition column: {name}"))
        })?;
        if partition_indices.contains(&index) {
            return Err(StorageError::InvalidData(format!(
                "Partition column listed twice: {name}"
            )));
        }
        partition_indices.push(index);
    }

    let data_schema: Vec<Column> = table
        .schema()
        .iter()
        .enumerate()
        .filter(|(index, _)| !partition_indices.contains(index))
        .map(|(_, column)| *column)
        .collect();

    if partition_by.is_empty() {
        return Ok(BTreeMap::from([(String::new(), table.clone())]));
    }

    let mut grouped: BTreeMap<String, Vec<Vec<Value>>> = BTreeMap::new();
    for row in table.rows() {
        let segments: Vec<(&str, &Value)> = partition_by
            .iter()
            .zip(&partition_indices)
            .map(|(name, index)| (*name, &row[*index]))
            .collect();
        let data_row = row
            .iter()
            .enumerate()
            .filter(|(index, _)| !partition_indices.contains(index))
            .map(|(_, value)| value.clone())
            .collect();
        grouped
            .entry(partition_path(&segments))
            .or_default()
            .push(data_row);
    }

    Ok(grouped
        .into_iter()
        .map(|(path, rows)| (path, Table::from_parts(data_schema.clone(), rows)))
        .collect())
}

/// Parses a relative partition directory into typed values.
///
/// Every segment must name a column of `schema`.
pub fn parse_partition_path(path: &str, schema: &[Column]) -> Result<Vec<(Column, Value)>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, raw) = segment.split_once('=').ok_or_else(|| {
                StorageError::InvalidData(format!("Not a partition directory: {segment}"))
            })?;
            let column = schema
                .iter()
                .find(|column| column.name == name)
                .ok_or_else(|| {
                    StorageError::InvalidData(format!("Unknown partition column: {name}"))
                })?;
            Ok((*column, parse_value(raw, column.kind)?))
        })
        .collect()
}

/// Columns of `schema` that live in the data files rather than the path.
pub fn data_columns(schema: &[Column], partition: &[(Column, Value)]) -> Vec<Column> {
    schema
        .iter()
        .filter(|column| !partition.iter().any(|(p, _)| p.name == column.name))
        .copied()
        .collect()
}

/// Rebuilds full rows in `schema` order from data-file rows plus the values
/// parsed from their partition path.
pub fn merge_partition_values(
    schema: &[Column],
    data_schema: &[Column],
    rows: Vec<Vec<Value>>,
    partition: &[(Column, Value)],
) -> Result<Vec<Vec<Value>>> {
    enum Source<'a> {
        Data(usize),
        Partition(&'a Value),
    }

    let sources = schema
        .iter()
        .map(|column| {
            if let Some(index) = data_schema.iter().position(|c| c.name == column.name) {
                return Ok(Source::Data(index));
            }
            partition
                .iter()
                .find(|(p, _)| p.name == column.name)
                .map(|(_, value)| Source::Partition(value))
                .ok_or_else(|| {
                    StorageError::InvalidData(format!("Missing column: {}", column.name))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|row| {
            if row.len() != data_schema.len() {
                return Err(StorageError::InvalidData(format!(
                    "Row has {} values but the data files have {} columns",
                    row.len(),
                    data_schema.len()
                )));
            }
            Ok(sources
                .iter()
                .map(|source| match source {
                    Source::Data(index) => row[*index].clone(),
                    Source::Partition(value) => (*value).clone(),
                })
                .collect())
        })
        .collect()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => DEFAULT_PARTITION.to_string(),
        Value::Int32(n) => n.to_string(),
        Value::Int64(n) => n.to_string(),
        Value::Float64(n) => format!("{n:?}"),
        Value::Utf8(s) => escape_path_name(s),
        Value::Timestamp(ts) => escape_path_name(&ts.format(TIMESTAMP_FORMAT).to_string()),
    }
}

fn parse_value(raw: &str, kind: ColumnType) -> Result<Value> {
    if raw == DEFAULT_PARTITION {
        return Ok(Value::Null);
    }
    let invalid = |reason: String| {
        StorageError::InvalidData(format!("Bad {kind} partition value {raw:?}: {reason}"))
    };
    let text = unescape_path_name(raw).map_err(invalid)?;
    let value = match kind {
        ColumnType::Int32 => Value::Int32(text.parse().map_err(|e| invalid(format!("{e}")))?),
        ColumnType::Int64 => Value::Int64(text.parse().map_err(|e| invalid(format!("{e}")))?),
        ColumnType::Float64 => {
            Value::Float64(text.parse().map_err(|e| invalid(format!("{e}")))?)
        }
        ColumnType::Utf8 => Value::Utf8(text),
        ColumnType::Timestamp => Value::Timestamp(
            NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
                .map_err(|e| invalid(format!("{e}")))?,
        ),
    };
    Ok(value)
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{01}'..='\u{1F}'
            | '"'
            | '#'
            | '%'
            | '\''
            | '*'
            | '/'
            | ':'
            | '='
            | '?'
            | '\\'
            | '\u{7F}'
            | '{'
            | '['
            | ']'
            | '^'
    )
}

fn escape_path_name(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn unescape_path_name(s: &str) -> std::result::Result<String, String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .ok_or_else(|| "truncated escape".to_string())?;
            let byte = u8::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SCHEMA: &[Column] = &[
        Column::required("song_id", ColumnType::Utf8),
        Column::required("artist_id", ColumnType::Utf8),
        Column::required("year", ColumnType::Int64),
        Column::nullable("duration", ColumnType::Float64),
    ];

    fn row(song: &str, artist: &str, year: i64, duration: Option<f64>) -> Vec<Value> {
        vec![
            Value::Utf8(song.into()),
            Value::Utf8(artist.into()),
            Value::Int64(year),
            duration.into(),
        ]
    }

    fn table() -> Table {
        Table::new(
            SCHEMA.to_vec(),
            vec![
                row("S1", "AR1", 2000, Some(1.0)),
                row("S2", "AR2", 0, None),
                row("S3", "AR1", 2000, Some(3.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_without_partition_columns() {
        let partitions = split_partitions(&table(), &[]).unwrap();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[""], table());
    }

    #[test]
    fn test_split_groups_rows_by_partition_values() {
        let partitions = split_partitions(&table(), &["year", "artist_id"]).unwrap();
        let paths: Vec<&str> = partitions.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["year=0/artist_id=AR2", "year=2000/artist_id=AR1"]);

        let ar1 = &partitions["year=2000/artist_id=AR1"];
        let names: Vec<&str> = ar1.schema().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["song_id", "duration"]);
        assert_eq!(ar1.len(), 2);
        assert_eq!(ar1.rows()[0][0], Value::Utf8("S1".into()));
        assert_eq!(ar1.rows()[1][0], Value::Utf8("S3".into()));
    }

    #[test]
    fn test_every_row_lands_under_its_own_values() {
        let partitions = split_partitions(&table(), &["year", "artist_id"]).unwrap();
        for (path, part) in &partitions {
            let parsed = parse_partition_path(path, SCHEMA).unwrap();
            let restored = merge_partition_values(
                SCHEMA,
                part.schema(),
                part.rows().to_vec(),
                &parsed,
            )
            .unwrap();
            for full in restored {
                assert!(table().rows().contains(&full));
                let expected = format!(
                    "year={}/artist_id={}",
                    match &full[2] {
                        Value::Int64(y) => y.to_string(),
                        other => panic!("unexpected {other:?}"),
                    },
                    match &full[1] {
                        Value::Utf8(a) => a.clone(),
                        other => panic!("unexpected {other:?}"),
                    }
                );
                assert_eq!(path, &expected);
            }
        }
    }

    #[test]
    fn test_split_rejects_unknown_column() {
        let result = split_partitions(&table(), &["genre"]);
        assert_eq!(
            result,
            Err(StorageError::InvalidData(
                "Unknown partition column: genre".to_string()
            ))
        );
    }

    #[test]
    fn test_null_partition_value_uses_default_directory() {
        let partitions = split_partitions(&table(), &["duration"]).unwrap();
        assert!(partitions.contains_key("duration=__HIVE_DEFAULT_PARTITION__"));
        assert!(partitions.contains_key("duration=1.0"));

        let parsed = parse_partition_path("duration=__HIVE_DEFAULT_PARTITION__", SCHEMA).unwrap();
        assert_eq!(parsed, vec![(SCHEMA[3], Value::Null)]);
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let value = Value::Utf8("AC/DC: live=100%".into());
        let path = partition_path(&[("artist_id", &value)]);
        assert_eq!(path, "artist_id=AC%2FDC%3A live%3D100%25");

        let parsed = parse_partition_path(&path, SCHEMA).unwrap();
        assert_eq!(parsed, vec![(SCHEMA[1], value)]);
    }

    #[test]
    fn test_timestamp_partition_value() {
        let ts = NaiveDate::from_ymd_opt(2018, 11, 15)
            .unwrap()
            .and_hms_milli_opt(0, 30, 26, 796)
            .unwrap();
        let value = Value::Timestamp(ts);
        let path = partition_path(&[("start_time", &value)]);
        assert_eq!(path, "start_time=2018-11-15 00%3A30%3A26.796");

        let schema = [Column::required("start_time", ColumnType::Timestamp)];
        let parsed = parse_partition_path(&path, &schema).unwrap();
        assert_eq!(parsed[0].1, value);
    }

    #[test]
    fn test_parse_rejects_bad_segments() {
        assert!(parse_partition_path("year", SCHEMA).is_err());
        assert!(parse_partition_path("genre=rock", SCHEMA).is_err());
        assert!(parse_partition_path("year=abc", SCHEMA).is_err());
        assert!(parse_partition_path("artist_id=%2", SCHEMA).is_err());
        assert_eq!(parse_partition_path("", SCHEMA).unwrap(), vec![]);
    }

    #[test]
    fn test_merge_reports_missing_columns() {
        let data = &SCHEMA[..2];
        let result = merge_partition_values(SCHEMA, data, vec![], &[]);
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_data_columns_excludes_partition_columns() {
        let partition = vec![(SCHEMA[2], Value::Int64(2000))];
        let columns = data_columns(SCHEMA, &partition);
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["song_id", "artist_id", "duration"]);
    }
}
