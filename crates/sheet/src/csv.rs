//! Delimited-text codec for [`Table`]
//!
//! The first record is always the column-name row; remaining records are
//! data rows. Values are kept as strings unless type inference is requested,
//! so numeric-looking identifiers survive a round trip untouched.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::Table;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether to use type inference when reading (default: off)
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            infer_types: false,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Map a csv-crate failure to a positioned parse error
fn parse_error(err: &csv::Error) -> SheetError {
    let line = err.position().map_or(0, csv::Position::line);
    SheetError::Parse {
        line,
        message: err.to_string(),
    }
}

impl Table {
    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Load a table from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(reader, options)
    }

    /// Load a table from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_str_with_options(content, CsvOptions::default())
    }

    /// Load a table from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), options)
    }

    /// Load a table from a reader
    ///
    /// # Errors
    ///
    /// Returns `Parse` (with the 1-based line of the defect) for empty
    /// input, ragged records, or any other csv-level failure.
    pub fn from_csv_reader<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // The header row is modeled explicitly
            .flexible(false)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(result) => result.map_err(|e| parse_error(&e))?,
            None => {
                return Err(SheetError::Parse {
                    line: 1,
                    message: "input has no header row".to_string(),
                })
            }
        };
        let columns: Vec<String> = header.iter().map(ToString::to_string).collect();

        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        for result in records {
            let record = result.map_err(|e| parse_error(&e))?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if options.infer_types {
                        CellValue::parse(field)
                    } else if field.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Table::new(columns, rows)
    }

    /// Save the table to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_as_csv_with_options(path, CsvOptions::default())
    }

    /// Save the table to a CSV file with custom options
    pub fn save_as_csv_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: CsvOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, options)
    }

    /// Write the table to a writer as CSV (header row first)
    ///
    /// Values containing the delimiter, quote character, or line breaks are
    /// quoted by the csv crate.
    pub fn write_csv<W: Write>(&self, writer: W, options: CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        csv_writer.write_record(self.columns())?;
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the table to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        self.to_csv_string_with_options(CsvOptions::default())
    }

    /// Convert the table to a CSV string with custom options
    #[must_use]
    pub fn to_csv_string_with_options(&self, options: CsvOptions) -> String {
        let mut buffer = Vec::new();
        // Ignore errors for string conversion
        let _ = self.write_csv(&mut buffer, options);
        String::from_utf8_lossy(&buffer).to_string()
    }

    /// Convert the table to a TSV string
    #[must_use]
    pub fn to_tsv_string(&self) -> String {
        self.to_csv_string_with_options(CsvOptions::tsv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_csv_str() {
        let csv = "name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = Table::from_csv_str(csv).unwrap();

        assert_eq!(table.columns(), &["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        // Inference is off by default: numbers stay strings
        assert_eq!(table.get(0, 1).unwrap(), &CellValue::String("30".to_string()));
    }

    #[test]
    fn test_type_inference_opt_in() {
        let csv = "string,int,float,bool,empty\nhello,42,2.5,true,";
        let options = CsvOptions::default().with_type_inference(true);
        let table = Table::from_csv_str_with_options(csv, options).unwrap();

        assert_eq!(table.get(0, 0).unwrap(), &CellValue::String("hello".to_string()));
        assert_eq!(table.get(0, 1).unwrap(), &CellValue::Int(42));
        assert_eq!(table.get(0, 2).unwrap(), &CellValue::Float(2.5));
        assert_eq!(table.get(0, 3).unwrap(), &CellValue::Bool(true));
        assert_eq!(table.get(0, 4).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = Table::from_csv_str("").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_ragged_record_reports_line() {
        let csv = "a,b\n1,2\n3";
        let err = Table::from_csv_str(csv).unwrap_err();
        match err {
            SheetError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_quoting_round_trip() {
        let table = Table::from_rows(
            vec!["text"],
            vec![
                vec!["has,comma"],
                vec!["has \"quote\""],
                vec!["has\nnewline"],
            ],
        )
        .unwrap();

        let csv = table.to_csv_string();
        let restored = Table::from_csv_str(&csv).unwrap();
        assert_eq!(table, restored);
    }

    #[test]
    fn test_utf8_round_trip() {
        let csv = "名字,数量\n连招,3\n攻击,10\n";
        let table = Table::from_csv_str(csv).unwrap();
        assert_eq!(table.columns()[0], "名字");

        let out = table.to_csv_string();
        assert_eq!(Table::from_csv_str(&out).unwrap(), table);
    }

    #[test]
    fn test_null_encodes_as_empty_field() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Null, CellValue::Int(1)]],
        )
        .unwrap();

        let csv = table.to_csv_string();
        assert!(csv.contains(",1"));

        let restored = Table::from_csv_str(&csv).unwrap();
        assert_eq!(restored.get(0, 0).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_save_and_load_csv_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");

        let table = Table::from_rows(vec!["x", "y"], vec![vec!["1", "2"]]).unwrap();
        table.save_as_csv(&file_path).unwrap();

        let loaded = Table::from_csv(&file_path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_tsv() {
        let tsv = "name\tage\nAlice\t30";
        let table = Table::from_csv_str_with_options(tsv, CsvOptions::tsv()).unwrap();

        assert_eq!(table.columns(), &["name", "age"]);
        assert_eq!(table.row_count(), 1);

        let output = table.to_tsv_string();
        assert!(output.starts_with("name\tage"));
    }
}
