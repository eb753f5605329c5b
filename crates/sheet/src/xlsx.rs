//! Workbook read support (calamine)
//!
//! The first row of a worksheet range becomes the column names; remaining
//! rows become typed cells. Writing goes through the upsert module, which
//! owns the temp-file-then-rename discipline.

use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::table::Table;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn workbook_error(err: XlsxError) -> SheetError {
    SheetError::Workbook(err.to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as serial days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Build a table from a worksheet range: header row, then data rows
fn range_to_table(range: &calamine::Range<Data>) -> Result<Table> {
    let mut rows_iter = range.rows();
    let Some(header) = rows_iter.next() else {
        return Ok(Table::empty());
    };

    let columns: Vec<String> = header
        .iter()
        .map(|cell| data_to_cell_value(cell).as_str())
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for row in rows_iter {
        let mut cells: Vec<CellValue> = row.iter().map(data_to_cell_value).collect();
        // The used range can be ragged; pad to the header width
        cells.resize(columns.len(), CellValue::Null);
        cells.truncate(columns.len());
        rows.push(cells);
    }

    Table::new(columns, rows)
}

impl Table {
    /// Load the first sheet of an Excel file as a table
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(workbook_error)?;

        let sheet_names = workbook.sheet_names().to_vec();
        let Some(first) = sheet_names.first() else {
            return Ok(Table::empty());
        };

        Self::from_xlsx_sheet(path, first)
    }

    /// Load a specific sheet of an Excel file by name
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the file cannot be opened, the sheet is
    /// missing, or the read fails.
    pub fn from_xlsx_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(workbook_error)?;

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(workbook_error)?;

        range_to_table(&range)
    }
}

impl Book {
    /// Load every sheet of an Excel file, in file order
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the file cannot be opened or any sheet fails
    /// to read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(workbook_error)?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(workbook_error)?;
            book.add_sheet(&sheet_name, range_to_table(&range)?)?;
        }

        Ok(book)
    }

    /// Get sheet names from an Excel file without loading data
    ///
    /// # Errors
    ///
    /// Returns `Workbook` if the file cannot be opened.
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(workbook_error)?;

        Ok(workbook.sheet_names().to_vec())
    }
}
