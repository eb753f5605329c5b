use crate::cell::CellValue;
use crate::error::{Result, SheetError};

/// An immutable table of named columns and data rows (row-major storage).
///
/// The intermediate representation shared by the text codecs and the
/// workbook writer. Every row is guaranteed to have exactly as many cells
/// as there are columns; the invariant is checked once at construction and
/// cannot be broken afterwards because the fields have no public mutators.
///
/// Column names are ordered and conventionally unique, but uniqueness is
/// not enforced: workbook files and delimited text both allow repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table, validating that every row matches the column count
    ///
    /// # Errors
    ///
    /// Returns `RowLengthMismatch` naming the first offending row (0-based).
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SheetError::RowLengthMismatch {
                    row: idx,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Table { columns, rows })
    }

    /// Create an empty table with no columns and no rows
    #[must_use]
    pub fn empty() -> Self {
        Table {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and convertible row values
    ///
    /// # Errors
    ///
    /// Returns `RowLengthMismatch` if any row disagrees with the header.
    pub fn from_rows<S, T>(columns: Vec<S>, rows: Vec<Vec<T>>) -> Result<Self>
    where
        S: Into<String>,
        T: Into<CellValue>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Table::new(columns, rows)
    }

    /// Get the column names in order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the data rows (header excluded)
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get the number of data rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has neither columns nor rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Get a cell by data-row and column index
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Worksheet row count the table occupies once written: one header row
    /// plus data rows up to the last row holding any non-null cell.
    ///
    /// Workbook readers report the used range only, so trailing all-null
    /// rows are not observable after a round trip; verification compares
    /// against this number rather than `row_count() + 1`.
    #[must_use]
    pub fn occupied_row_count(&self) -> usize {
        let last_used = self
            .rows
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_null()))
            .map_or(0, |idx| idx + 1);
        1 + last_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_row_length() {
        let err = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Int(1)]],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SheetError::RowLengthMismatch {
                row: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_from_rows() {
        let table = Table::from_rows(
            vec!["Name", "Age"],
            vec![vec!["Alice", "30"], vec!["Bob", "25"]],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 2);
        assert_eq!(table.columns()[1], "Age");
        assert_eq!(table.get(0, 0), Some(&CellValue::String("Alice".into())));
        assert_eq!(table.get(2, 0), None);
    }

    #[test]
    fn test_empty() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert_eq!(table.occupied_row_count(), 1);
    }

    #[test]
    fn test_occupied_row_count_ignores_trailing_nulls() {
        let table = Table::new(
            vec!["a".to_string()],
            vec![
                vec![CellValue::Int(1)],
                vec![CellValue::Null],
                vec![CellValue::Null],
            ],
        )
        .unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.occupied_row_count(), 2);
    }
}
