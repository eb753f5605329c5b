//! Tabular data core for sheetport
//!
//! Provides an immutable table model with CSV/TSV and JSON-records codecs,
//! Excel workbook reading, and a resilient sheet upsert that never loses
//! unrelated sheets.
//!
//! # Examples
//!
//! ## Decoding CSV
//!
//! ```
//! use sheetport_sheet::Table;
//!
//! let table = Table::from_csv_str("name,age\nAlice,30\nBob,25").unwrap();
//!
//! assert_eq!(table.columns(), &["name", "age"]);
//! assert_eq!(table.row_count(), 2);
//! ```
//!
//! ## JSON records round trip
//!
//! ```
//! use sheetport_sheet::Table;
//!
//! let table = Table::from_records_str(r#"[{"name": "Alice", "age": 30}]"#).unwrap();
//! let json = table.to_records_string().unwrap();
//!
//! assert_eq!(Table::from_records_str(&json).unwrap(), table);
//! ```
//!
//! ## Upserting a sheet into a workbook
//!
//! ```no_run
//! use sheetport_sheet::{upsert, Table, UpsertOptions};
//!
//! let table = Table::from_csv_str("id,value\n1,foo").unwrap();
//! let report = upsert("data.xlsx", "Imported", &table, &UpsertOptions::default()).unwrap();
//!
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! # Resilience
//!
//! [`upsert`] tries three strategies in order (create, in-place replace,
//! sheet-by-sheet rebuild) and writes through a temp-file-then-rename
//! discipline, so a failed write never corrupts the existing file. Dropping
//! unrelated sheets requires an explicit [`UpsertOptions::allow_data_loss`]
//! opt-in and is always reported as an error.

mod book;
mod cell;
mod csv;
mod error;
mod json;
mod style;
mod table;
mod upsert;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export error types.
pub use error::{Result, SheetError, UpsertError};
/// Re-export formatting policy types.
pub use style::{FormatWarning, SheetFormats, ROW_ID_HEADER};
/// Re-export table type.
pub use table::Table;
/// Re-export the upsert operation and its types.
pub use upsert::{
    upsert, upsert_from_delimited, upsert_from_records, UpsertOptions, UpsertOutcome, UpsertReport,
};
