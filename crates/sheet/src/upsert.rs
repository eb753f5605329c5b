//! Resilient workbook sheet upsert
//!
//! Write-or-replace one named sheet in a possibly pre-existing workbook
//! without ever losing unrelated sheets or leaving a half-written file.
//! Durability always goes through a temporary file in the destination
//! directory followed by an atomic rename, so a concurrent reader observes
//! either the fully-old or the fully-new workbook.
//!
//! Three tiers are attempted in order:
//!
//! 1. create: no file exists yet; write a one-sheet workbook
//! 2. replace: load the whole workbook, swap the sheet in place, verify
//!    the rewritten file before renaming it over the original
//! 3. rebuild: re-read the surviving sheets one by one from the untouched
//!    original and build a fresh workbook around the new sheet
//!
//! Tier failures are logged and trigger fallthrough; only exhaustion of all
//! tiers reaches the caller. The degraded last resort (a single-sheet
//! workbook that drops everything else) runs only with an explicit opt-in
//! and is always reported as [`UpsertError::RecoveredWithDataLoss`].

use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError, UpsertError};
use crate::style::{apply_sheet_chrome, FormatWarning, SheetFormats};
use crate::table::Table;
use calamine::{open_workbook, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Options for the upsert operation
#[derive(Debug, Clone, Default)]
pub struct UpsertOptions {
    /// Permit the degraded single-sheet rewrite when the existing workbook
    /// cannot be recovered. Off by default: losing unrelated sheets must be
    /// an explicit caller decision.
    pub allow_data_loss: bool,
}

/// Which tier produced the durable workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No prior file existed; a new workbook was created
    Created,
    /// The existing workbook was loaded and the sheet replaced in place
    Replaced,
    /// The workbook was rebuilt sheet-by-sheet from the original file
    Rebuilt,
}

/// Successful upsert result: the tier used plus any non-fatal formatting
/// problems encountered on the target sheet
#[derive(Debug)]
pub struct UpsertReport {
    pub outcome: UpsertOutcome,
    pub warnings: Vec<FormatWarning>,
}

/// Write-or-replace `sheet_name` in the workbook at `path`.
///
/// On success the workbook contains `sheet_name` with `table`'s content,
/// formatted per the sheet policy, and every other pre-existing sheet with
/// its content in its original relative order. On failure the prior file is
/// untouched.
///
/// # Errors
///
/// - `EmptySheetName` if `sheet_name` is empty.
/// - `Unrecoverable` if every tier failed; the original file is intact.
/// - `RecoveredWithDataLoss` if the degraded single-sheet rewrite ran
///   (requires [`UpsertOptions::allow_data_loss`]); the new file holds only
///   the target sheet.
pub fn upsert<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    table: &Table,
    options: &UpsertOptions,
) -> std::result::Result<UpsertReport, UpsertError> {
    upsert_inner(path.as_ref(), sheet_name, table, options, FaultInjection::default())
}

/// Decode a JSON array of objects, then upsert it
///
/// # Errors
///
/// `Decode` for malformed input, otherwise as [`upsert`].
pub fn upsert_from_records<P: AsRef<Path>>(
    json_text: &str,
    path: P,
    sheet_name: &str,
    options: &UpsertOptions,
) -> std::result::Result<UpsertReport, UpsertError> {
    let table = Table::from_records_str(json_text)?;
    upsert(path, sheet_name, &table, options)
}

/// Decode delimited text (header row first), then upsert it
///
/// # Errors
///
/// `Decode` for malformed input, otherwise as [`upsert`].
pub fn upsert_from_delimited<P: AsRef<Path>>(
    csv_text: &str,
    path: P,
    sheet_name: &str,
    options: &UpsertOptions,
) -> std::result::Result<UpsertReport, UpsertError> {
    let table = Table::from_csv_str(csv_text)?;
    upsert(path, sheet_name, &table, options)
}

/// Forced tier failures, used by tests to exercise the fallthrough and
/// degraded paths. A flagged tier fails after all its reads but before any
/// durable write.
#[derive(Debug, Clone, Copy, Default)]
struct FaultInjection {
    replace: bool,
    rebuild: bool,
}

/// The tier state machine
fn upsert_inner(
    path: &Path,
    sheet_name: &str,
    table: &Table,
    options: &UpsertOptions,
    faults: FaultInjection,
) -> std::result::Result<UpsertReport, UpsertError> {
    if sheet_name.is_empty() {
        return Err(UpsertError::EmptySheetName);
    }

    // Tier 1: no prior file
    if !path.exists() {
        let mut book = Book::new();
        book.add_sheet(sheet_name, table.clone())
            .map_err(|e| unrecoverable(path, &e))?;
        let warnings =
            write_book_atomic(path, &book, sheet_name, None).map_err(|e| unrecoverable(path, &e))?;
        return Ok(UpsertReport {
            outcome: UpsertOutcome::Created,
            warnings,
        });
    }

    // Tier 2: in-place replace
    match replace_tier(path, sheet_name, table, faults.replace) {
        Ok(warnings) => {
            return Ok(UpsertReport {
                outcome: UpsertOutcome::Replaced,
                warnings,
            })
        }
        Err(e) => {
            tracing::warn!(
                "in-place replace of '{sheet_name}' in {} failed: {e}; rebuilding from original",
                path.display()
            );
        }
    }

    // Tier 3: rebuild from the still-untouched original
    let rebuild_reason = match rebuild_tier(path, sheet_name, table, faults.rebuild) {
        Ok(warnings) => {
            return Ok(UpsertReport {
                outcome: UpsertOutcome::Rebuilt,
                warnings,
            })
        }
        Err(e) => {
            tracing::warn!(
                "rebuild of {} failed: {e}",
                path.display()
            );
            e
        }
    };

    if !options.allow_data_loss {
        return Err(unrecoverable(path, &rebuild_reason));
    }

    // Degraded last resort: a single-sheet workbook, dropping everything
    // else. Never silent; the caller opted in and still gets a distinct
    // error naming what was lost (when the names are still readable).
    let dropped: Vec<String> = Book::xlsx_sheet_names(path)
        .map(|names| names.into_iter().filter(|n| n != sheet_name).collect())
        .unwrap_or_default();

    let mut book = Book::new();
    book.add_sheet(sheet_name, table.clone())
        .map_err(|e| unrecoverable(path, &e))?;
    write_book_atomic(path, &book, sheet_name, None).map_err(|e| unrecoverable(path, &e))?;

    Err(UpsertError::RecoveredWithDataLoss {
        path: path.to_path_buf(),
        sheet: sheet_name.to_string(),
        dropped,
    })
}

fn unrecoverable(path: &Path, err: &SheetError) -> UpsertError {
    UpsertError::Unrecoverable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Tier 2: load the whole workbook, swap the sheet (same position if it
/// existed, appended if new), write to temp, verify, rename into place.
fn replace_tier(
    path: &Path,
    sheet_name: &str,
    table: &Table,
    inject_failure: bool,
) -> Result<Vec<FormatWarning>> {
    let mut book = Book::from_xlsx(path)?;

    match book.sheet_index(sheet_name) {
        Some(index) => {
            book.remove_sheet(sheet_name)?;
            book.insert_sheet_at(index, sheet_name, table.clone())?;
        }
        None => book.add_sheet(sheet_name, table.clone())?,
    }

    if inject_failure {
        return Err(SheetError::Workbook(
            "injected replace-tier failure".to_string(),
        ));
    }

    write_book_atomic(path, &book, sheet_name, Some(table.occupied_row_count()))
}

/// Tier 3: buffer every surviving sheet from the original, then build a
/// fresh workbook with the target sheet first.
fn rebuild_tier(
    path: &Path,
    sheet_name: &str,
    table: &Table,
    inject_failure: bool,
) -> Result<Vec<FormatWarning>> {
    let names = Book::xlsx_sheet_names(path)?;

    let mut book = Book::new();
    book.add_sheet(sheet_name, table.clone())?;
    for other in names.iter().filter(|n| n.as_str() != sheet_name) {
        let buffered = Table::from_xlsx_sheet(path, other)?;
        book.add_sheet(other, buffered)?;
    }

    if inject_failure {
        return Err(SheetError::Workbook(
            "injected rebuild-tier failure".to_string(),
        ));
    }

    write_book_atomic(path, &book, sheet_name, None)
}

/// Serialize a book to a temporary file next to `path` and atomically move
/// it into place. Only the target sheet is styled. When `verify_rows` is
/// set, the temp file is reopened and the target sheet checked before the
/// rename.
fn write_book_atomic(
    path: &Path,
    book: &Book,
    styled_sheet: &str,
    verify_rows: Option<usize>,
) -> Result<Vec<FormatWarning>> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let temp = tempfile::Builder::new()
        .prefix(".sheetport-")
        .suffix(".xlsx")
        .tempfile_in(&parent)?;

    let mut workbook = Workbook::new();
    let mut warnings = Vec::new();
    for (name, sheet_table) in book.iter() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name).map_err(xlsx_error)?;
        if name == styled_sheet {
            warnings.extend(write_styled_sheet(worksheet, name, sheet_table)?);
        } else {
            write_plain_sheet(worksheet, sheet_table)?;
        }
    }
    workbook.save(temp.path()).map_err(xlsx_error)?;

    if let Some(expected) = verify_rows {
        verify_written(temp.path(), styled_sheet, expected)?;
    }

    // The rename is the commit point; everything before it leaves the
    // destination untouched
    temp.persist(path).map_err(|e| SheetError::Io(e.error))?;
    Ok(warnings)
}

/// Reopen a freshly written file and confirm the target sheet is present
/// and covers the expected rows. Trailing all-null rows are not part of the
/// used range, so the check is a lower bound.
fn verify_written(path: &Path, sheet_name: &str, expected_rows: usize) -> Result<()> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path).map_err(read_error)?;
    let range = workbook.worksheet_range(sheet_name).map_err(read_error)?;

    if range.height() < expected_rows {
        return Err(SheetError::Workbook(format!(
            "verification failed: sheet '{sheet_name}' has {} rows, expected at least {expected_rows}",
            range.height()
        )));
    }
    Ok(())
}

/// Write the target sheet with the formatting policy applied: styled
/// header, styled type-annotation row when present, column widths, freeze
/// boundary.
fn write_styled_sheet(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    table: &Table,
) -> Result<Vec<FormatWarning>> {
    let formats = SheetFormats::new();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_num(col)?, name, formats.header_for(col, name))
            .map_err(xlsx_error)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        // Worksheet row 2 is the type-annotation row by convention
        let format = (row_idx == 0).then_some(&formats.type_row);
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_idx + 1, col_idx, cell, format)?;
        }
    }

    Ok(apply_sheet_chrome(worksheet, sheet_name, table))
}

/// Write a preserved sheet verbatim: header row then data rows, no styling
fn write_plain_sheet(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col_num(col)?, name)
            .map_err(xlsx_error)?;
    }
    for (row_idx, row) in table.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_idx + 1, col_idx, cell, None)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    let row_num = row_num(row)?;
    let col_num = col_num(col)?;

    match (cell, format) {
        // An unformatted null cell is simply absent
        (CellValue::Null, None) => {}
        (CellValue::Null, Some(f)) => {
            worksheet.write_blank(row_num, col_num, f).map_err(xlsx_error)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row_num, col_num, *b).map_err(xlsx_error)?;
        }
        (CellValue::Bool(b), Some(f)) => {
            worksheet
                .write_boolean_with_format(row_num, col_num, *b, f)
                .map_err(xlsx_error)?;
        }
        // Excel stores all numbers as f64, so integers > 2^53 may lose
        // precision
        (CellValue::Int(i), None) => {
            worksheet
                .write_number(row_num, col_num, *i as f64)
                .map_err(xlsx_error)?;
        }
        (CellValue::Int(i), Some(f)) => {
            worksheet
                .write_number_with_format(row_num, col_num, *i as f64, f)
                .map_err(xlsx_error)?;
        }
        (CellValue::Float(v), None) => {
            worksheet.write_number(row_num, col_num, *v).map_err(xlsx_error)?;
        }
        (CellValue::Float(v), Some(f)) => {
            worksheet
                .write_number_with_format(row_num, col_num, *v, f)
                .map_err(xlsx_error)?;
        }
        (CellValue::String(s), None) => {
            worksheet.write_string(row_num, col_num, s).map_err(xlsx_error)?;
        }
        (CellValue::String(s), Some(f)) => {
            worksheet
                .write_string_with_format(row_num, col_num, s, f)
                .map_err(xlsx_error)?;
        }
    }
    Ok(())
}

fn row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| SheetError::Workbook(format!("row index overflow: {value}")))
}

fn col_num(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| SheetError::Workbook(format!("column index overflow: {value}")))
}

fn xlsx_error(err: XlsxError) -> SheetError {
    SheetError::Workbook(err.to_string())
}

fn read_error(err: calamine::XlsxError) -> SheetError {
    SheetError::Workbook(err.to_string())
}
