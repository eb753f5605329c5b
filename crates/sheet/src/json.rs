//! JSON records codec for [`Table`]
//!
//! A table serializes as an array of objects, one object per data row:
//! `[{"name": "Alice", "age": 30}, ...]`. On decode the column set is the
//! union of all keys encountered, in first-seen order; keys missing from a
//! record become null cells.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::Table;
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

impl Table {
    /// Load a table from a JSON file containing an array of objects
    pub fn from_records<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader).map_err(|e| SheetError::ParseRecord {
            record: 0,
            message: format!("invalid JSON: {e}"),
        })?;
        Self::from_records_value(&value)
    }

    /// Load a table from a JSON string containing an array of objects
    pub fn from_records_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| SheetError::ParseRecord {
            record: 0,
            message: format!("invalid JSON: {e}"),
        })?;
        Self::from_records_value(&value)
    }

    /// Build a table from a parsed JSON value
    ///
    /// # Errors
    ///
    /// Returns `ParseRecord` (with the offending record index) if the value
    /// is not an array or an element is not an object.
    pub fn from_records_value(value: &Value) -> Result<Self> {
        let array = value.as_array().ok_or_else(|| SheetError::ParseRecord {
            record: 0,
            message: "JSON must be an array of objects".to_string(),
        })?;

        // Column set is the union of all keys, in first-seen order
        let mut columns: IndexSet<String> = IndexSet::new();
        for (idx, item) in array.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| SheetError::ParseRecord {
                record: idx,
                message: "array element must be an object".to_string(),
            })?;
            for key in obj.keys() {
                columns.insert(key.clone());
            }
        }

        let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(array.len());
        for item in array {
            // Validated as an object above
            let obj = item.as_object().expect("record shape already checked");
            let row: Vec<CellValue> = columns
                .iter()
                .map(|name| json_value_to_cell(obj.get(name).unwrap_or(&Value::Null)))
                .collect();
            rows.push(row);
        }

        Table::new(columns.into_iter().collect(), rows)
    }

    /// Save the table to a JSON file as an array of objects
    pub fn save_as_records<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_records(writer, false)
    }

    /// Write the table to a writer as a JSON array of objects
    pub fn write_records<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        let json_array: Vec<Map<String, Value>> = self
            .rows()
            .iter()
            .map(|row| {
                self.columns()
                    .iter()
                    .zip(row.iter())
                    .map(|(name, cell)| (name.clone(), cell_to_json_value(cell)))
                    .collect()
            })
            .collect();

        if pretty {
            serde_json::to_writer_pretty(writer, &json_array)
                .map_err(|e| SheetError::Serialize(format!("JSON write error: {e}")))?;
        } else {
            serde_json::to_writer(writer, &json_array)
                .map_err(|e| SheetError::Serialize(format!("JSON write error: {e}")))?;
        }

        Ok(())
    }

    /// Convert the table to a JSON records string
    pub fn to_records_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_records(&mut buffer, false)?;
        // Safe: serde_json always outputs valid UTF-8
        Ok(String::from_utf8(buffer).expect("JSON output is always valid UTF-8"))
    }

    /// Convert the table to a pretty-printed JSON records string
    pub fn to_records_string_pretty(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_records(&mut buffer, true)?;
        // Safe: serde_json always outputs valid UTF-8
        Ok(String::from_utf8(buffer).expect("JSON output is always valid UTF-8"))
    }
}

/// Convert a serde_json Value to a CellValue
fn json_value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        Value::String(s) => CellValue::String(s.clone()),
        // For arrays and objects, convert to string representation
        Value::Array(_) | Value::Object(_) => CellValue::String(value.to_string()),
    }
}

/// Convert a CellValue to a serde_json Value
fn cell_to_json_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::Number((*i).into()),
        CellValue::Float(f) => {
            // from_f64 returns None for NaN and Infinity
            // Fall back to string representation to preserve data
            serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        CellValue::String(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_records_str() {
        let json = r#"[
            {"name": "Alice", "age": 30},
            {"name": "Bob", "age": 25}
        ]"#;

        let table = Table::from_records_str(json).unwrap();

        assert_eq!(table.columns(), &["name", "age"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, 1).unwrap(), &CellValue::Int(25));
    }

    #[test]
    fn test_key_union_first_seen_order() {
        let json = r#"[
            {"a": 1, "b": 2},
            {"b": 3, "c": 4}
        ]"#;

        let table = Table::from_records_str(json).unwrap();

        assert_eq!(table.columns(), &["a", "b", "c"]);
        // Missing keys become null cells
        assert_eq!(table.get(0, 2).unwrap(), &CellValue::Null);
        assert_eq!(table.get(1, 0).unwrap(), &CellValue::Null);
        assert_eq!(table.get(1, 2).unwrap(), &CellValue::Int(4));
    }

    #[test]
    fn test_column_order_is_first_seen_not_alphabetical() {
        let json = r#"[{"zeta": 1, "alpha": 2, "mid": 3}]"#;

        let table = Table::from_records_str(json).unwrap();

        // Requires serde_json's preserve_order feature; without it the map
        // hands keys over already sorted
        assert_eq!(table.columns(), &["zeta", "alpha", "mid"]);
        assert_eq!(table.get(0, 0).unwrap(), &CellValue::Int(1));
        assert_eq!(table.get(0, 2).unwrap(), &CellValue::Int(3));
    }

    #[test]
    fn test_from_records_empty_array() {
        let table = Table::from_records_str("[]").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_non_array_is_parse_error() {
        let err = Table::from_records_str(r#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, SheetError::ParseRecord { record: 0, .. }));
    }

    #[test]
    fn test_non_object_element_reports_index() {
        let err = Table::from_records_str(r#"[{"a": 1}, 7]"#).unwrap_err();
        match err {
            SheetError::ParseRecord { record, .. } => assert_eq!(record, 1),
            other => panic!("expected ParseRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_records_round_trip() {
        let json = r#"[{"name": "连招", "age": 30}, {"name": "Bob", "age": null}]"#;

        let table = Table::from_records_str(json).unwrap();
        let output = table.to_records_string().unwrap();
        let restored = Table::from_records_str(&output).unwrap();

        assert_eq!(table, restored);
    }

    #[test]
    fn test_types_preserved() {
        let json = r#"[{"bool": true, "int": 42, "float": 2.5, "string": "hello", "null": null}]"#;

        let table = Table::from_records_str(json).unwrap();
        assert_eq!(table.get(0, 0).unwrap(), &CellValue::Bool(true));
        assert_eq!(table.get(0, 1).unwrap(), &CellValue::Int(42));
        assert_eq!(table.get(0, 2).unwrap(), &CellValue::Float(2.5));
        assert_eq!(table.get(0, 4).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_nan_serializes_as_string() {
        let table = Table::new(
            vec!["value".to_string()],
            vec![vec![CellValue::Float(f64::NAN)]],
        )
        .unwrap();

        let json = table.to_records_string().unwrap();
        assert!(json.contains("\"NaN\""));
    }

    #[test]
    fn test_records_file_io() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");

        let table = Table::from_rows(vec!["id", "value"], vec![vec!["1", "foo"]]).unwrap();
        table.save_as_records(&file_path).unwrap();

        let loaded = Table::from_records(&file_path).unwrap();
        assert_eq!(loaded.row_count(), 1);
        assert_eq!(loaded.columns(), &["id", "value"]);
    }
}
