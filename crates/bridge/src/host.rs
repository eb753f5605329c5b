//! Sentinel-return entry points
//!
//! Some hosts cannot catch panics or consume structured Rust errors; they
//! only see a return value. Every function here is total: failures come
//! back as the sentinel (`""` for text, `false` for writes) and the real
//! error goes to the tracing log. Callers that can handle typed errors
//! should use `sheetport_sheet` directly instead.

use crate::translit;
use sheetport_sheet::{
    upsert_from_delimited, upsert_from_records, Table, UpsertError, UpsertOptions, UpsertReport,
};

/// Transliterate text to capitalized pinyin. Infallible; present here so
/// hosts have one import surface.
#[must_use]
pub fn to_pinyin(text: &str) -> String {
    translit::to_pinyin(text)
}

/// Read the first sheet of an Excel file as CSV text. Returns `""` on any
/// failure.
#[must_use]
pub fn excel_to_csv(path: &str) -> String {
    match Table::from_xlsx(path) {
        Ok(table) => table.to_csv_string(),
        Err(e) => {
            tracing::error!("excel_to_csv({path}): {e}");
            String::new()
        }
    }
}

/// Read a named sheet of an Excel file as a JSON array of objects. Returns
/// `""` on any failure.
#[must_use]
pub fn excel_to_json(path: &str, sheet_name: &str) -> String {
    let table = match Table::from_xlsx_sheet(path, sheet_name) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("excel_to_json({path}, '{sheet_name}'): {e}");
            return String::new();
        }
    };

    match table.to_records_string() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("excel_to_json({path}, '{sheet_name}'): {e}");
            String::new()
        }
    }
}

/// Upsert CSV text as a sheet of an Excel workbook. Returns `false` on any
/// failure; the prior file is untouched.
#[must_use]
pub fn csv_to_excel(csv_text: &str, path: &str, sheet_name: &str) -> bool {
    csv_to_excel_with_options(csv_text, path, sheet_name, &UpsertOptions::default())
}

/// [`csv_to_excel`] with explicit upsert options
#[must_use]
pub fn csv_to_excel_with_options(
    csv_text: &str,
    path: &str,
    sheet_name: &str,
    options: &UpsertOptions,
) -> bool {
    report_outcome(
        "csv_to_excel",
        path,
        sheet_name,
        options,
        upsert_from_delimited(csv_text, path, sheet_name, options),
    )
}

/// Upsert a JSON array of objects as a sheet of an Excel workbook. Returns
/// `false` on any failure; the prior file is untouched.
#[must_use]
pub fn json_to_excel(json_text: &str, path: &str, sheet_name: &str) -> bool {
    json_to_excel_with_options(json_text, path, sheet_name, &UpsertOptions::default())
}

/// [`json_to_excel`] with explicit upsert options
#[must_use]
pub fn json_to_excel_with_options(
    json_text: &str,
    path: &str,
    sheet_name: &str,
    options: &UpsertOptions,
) -> bool {
    report_outcome(
        "json_to_excel",
        path,
        sheet_name,
        options,
        upsert_from_records(json_text, path, sheet_name, options),
    )
}

/// Collapse an upsert result to the boolean the host sees, logging
/// everything the boolean cannot carry.
fn report_outcome(
    operation: &str,
    path: &str,
    sheet_name: &str,
    options: &UpsertOptions,
    result: Result<UpsertReport, UpsertError>,
) -> bool {
    match result {
        Ok(report) => {
            for warning in &report.warnings {
                tracing::warn!("{operation}({path}, '{sheet_name}'): {warning}");
            }
            tracing::info!(
                "{operation}({path}, '{sheet_name}'): {:?}",
                report.outcome
            );
            true
        }
        // The sheet was written; only pre-existing sheets were lost, which
        // the caller explicitly authorized
        Err(e @ UpsertError::RecoveredWithDataLoss { .. }) if options.allow_data_loss => {
            tracing::error!("{operation}({path}, '{sheet_name}'): {e}");
            true
        }
        Err(e) => {
            tracing::error!("{operation}({path}, '{sheet_name}'): {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_csv_to_excel_and_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        let path = path.to_str().unwrap();

        assert!(csv_to_excel("name,age\nAlice,30\n", path, "People"));

        let csv = excel_to_csv(path);
        assert!(csv.starts_with("name,age"));
        assert!(csv.contains("Alice,30"));
    }

    #[test]
    fn test_json_to_excel_and_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        let path = path.to_str().unwrap();

        assert!(json_to_excel(
            r#"[{"skill": "连招", "cost": 3}]"#,
            path,
            "Skills"
        ));

        let json = excel_to_json(path, "Skills");
        assert!(json.contains("连招"));
        assert!(json.contains("\"cost\""));
    }

    #[test]
    fn test_failures_return_sentinels() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.xlsx");
        let missing = missing.to_str().unwrap();

        assert_eq!(excel_to_csv(missing), "");
        assert_eq!(excel_to_json(missing, "Any"), "");

        let path = dir.path().join("out.xlsx");
        let path = path.to_str().unwrap();
        // Malformed input, empty sheet name
        assert!(!csv_to_excel("", path, "S"));
        assert!(!json_to_excel("{", path, "S"));
        assert!(!csv_to_excel("a,b\n1,2\n", path, ""));
    }

    #[test]
    fn test_data_loss_opt_in_reports_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        let path = path.to_str().unwrap();

        // Without the opt-in the write is refused
        assert!(!csv_to_excel("a\n1\n", path, "Data"));

        let options = UpsertOptions {
            allow_data_loss: true,
        };
        assert!(csv_to_excel_with_options("a\n1\n", path, "Data", &options));
        assert!(excel_to_csv(path).starts_with('a'));
    }
}
