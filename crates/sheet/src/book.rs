use crate::error::{Result, SheetError};
use crate::table::Table;
use indexmap::IndexMap;

/// An in-memory workbook: named tables in insertion order.
///
/// The mutation stage for the upsert tiers. The file on disk is the unit of
/// durability; a `Book` is only ever materialized, edited, and re-serialized
/// whole.
#[derive(Debug, Clone, Default)]
pub struct Book {
    sheets: IndexMap<String, Table>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Book {
            sheets: IndexMap::new(),
        }
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    /// Get a sheet by name
    ///
    /// # Errors
    ///
    /// Returns `SheetNotFound` if no sheet has that name.
    pub fn get_sheet(&self, name: &str) -> Result<&Table> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get the position of a sheet in the book order
    #[must_use]
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.get_index_of(name)
    }

    /// Append a sheet to the book
    ///
    /// # Errors
    ///
    /// Returns `SheetAlreadyExists` if the name is taken.
    pub fn add_sheet(&mut self, name: &str, table: Table) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }
        self.sheets.insert(name.to_string(), table);
        Ok(())
    }

    /// Insert a sheet at a position, shifting later sheets (preserves the
    /// relative order of everything else)
    ///
    /// # Errors
    ///
    /// Returns `SheetAlreadyExists` if the name is taken.
    pub fn insert_sheet_at(&mut self, index: usize, name: &str, table: Table) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }
        let index = index.min(self.sheets.len());
        self.sheets.shift_insert(index, name.to_string(), table);
        Ok(())
    }

    /// Remove a sheet by name, preserving the order of the rest
    ///
    /// # Errors
    ///
    /// Returns `SheetNotFound` if no sheet has that name.
    pub fn remove_sheet(&mut self, name: &str) -> Result<Table> {
        self.sheets
            .shift_remove(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Iterate over (name, table) pairs in book order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(val: i64) -> Table {
        Table::from_rows(vec!["v"], vec![vec![val]]).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut book = Book::new();
        book.add_sheet("A", table(1)).unwrap();
        book.add_sheet("B", table(2)).unwrap();

        assert_eq!(book.sheet_count(), 2);
        assert_eq!(book.sheet_names(), vec!["A", "B"]);
        assert_eq!(book.get_sheet("B").unwrap().get(0, 0).unwrap().as_int(), Some(2));
        assert!(book.get_sheet("C").is_err());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut book = Book::new();
        book.add_sheet("A", table(1)).unwrap();
        assert!(matches!(
            book.add_sheet("A", table(2)),
            Err(SheetError::SheetAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut book = Book::new();
        book.add_sheet("A", table(1)).unwrap();
        book.add_sheet("B", table(2)).unwrap();
        book.add_sheet("C", table(3)).unwrap();

        book.remove_sheet("B").unwrap();
        assert_eq!(book.sheet_names(), vec!["A", "C"]);
    }

    #[test]
    fn test_insert_at_index() {
        let mut book = Book::new();
        book.add_sheet("A", table(1)).unwrap();
        book.add_sheet("C", table(3)).unwrap();

        book.insert_sheet_at(1, "B", table(2)).unwrap();
        assert_eq!(book.sheet_names(), vec!["A", "B", "C"]);

        // Past-the-end index appends
        book.insert_sheet_at(99, "D", table(4)).unwrap();
        assert_eq!(book.sheet_names(), vec!["A", "B", "C", "D"]);
    }
}
