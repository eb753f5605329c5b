use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during table and codec operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("Parse error at record {record}: {message}")]
    ParseRecord { record: usize, message: String },

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the workbook upsert operation.
///
/// Individual tier failures are not represented here; they are caught
/// internally and trigger fallthrough to the next tier. Only exhaustion of
/// every tier escapes to the caller.
#[derive(Error, Debug)]
pub enum UpsertError {
    #[error("Sheet name must not be empty")]
    EmptySheetName,

    /// Input text could not be decoded into a table; nothing was written
    #[error("Input could not be decoded: {0}")]
    Decode(#[from] SheetError),

    #[error("All write strategies failed for {}: {reason}", path.display())]
    Unrecoverable { path: PathBuf, reason: String },

    #[error(
        "Wrote sheet '{sheet}' to {} but dropped existing sheets: {dropped:?}",
        path.display()
    )]
    RecoveredWithDataLoss {
        path: PathBuf,
        sheet: String,
        dropped: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, SheetError>;
