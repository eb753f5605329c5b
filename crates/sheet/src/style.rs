//! Sheet formatting policy
//!
//! Downstream consumers expect the first worksheet row to be a label row and
//! the second a type-annotation row, both visually distinct and pinned while
//! scrolling. The policy is positional: the writer applies it to the target
//! sheet of an upsert and nowhere else.
//!
//! Style-only failures (column widths, freeze panes) are demoted to
//! [`FormatWarning`]s because the cell data is already complete when they
//! are applied.

use crate::table::Table;
use rust_xlsxwriter::{Color, Format, FormatAlign, Worksheet};
use std::fmt;

/// Reserved header name for the row-identifier column. When the first
/// column carries it, the header text is inverted for contrast.
pub const ROW_ID_HEADER: &str = "Row_Name";

/// Header row fill
const HEADER_FILL: Color = Color::RGB(0x4F81BD);
/// Type-annotation row fill
const TYPE_ROW_FILL: Color = Color::RGB(0xE6E6E6);
/// Type-annotation row font color
const TYPE_ROW_FONT: Color = Color::RGB(0x666666);
/// Extra character columns added to every computed column width
const WIDTH_PADDING: usize = 2;

/// A non-fatal formatting problem. The sheet data is durable; only its
/// appearance is degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatWarning {
    pub sheet: String,
    pub detail: String,
}

impl fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "formatting '{}': {}", self.sheet, self.detail)
    }
}

/// Cell formats for the two styled rows of a target sheet
#[derive(Debug)]
pub struct SheetFormats {
    /// Bold, accent fill, centered
    pub header: Format,
    /// Header variant for the reserved row-identifier column
    pub header_row_id: Format,
    /// Italic, muted gray on light gray, centered
    pub type_row: Format,
}

impl SheetFormats {
    #[must_use]
    pub fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let header_row_id = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let type_row = Format::new()
            .set_italic()
            .set_font_color(TYPE_ROW_FONT)
            .set_background_color(TYPE_ROW_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        SheetFormats {
            header,
            header_row_id,
            type_row,
        }
    }

    /// Format for a header cell at the given column
    #[must_use]
    pub fn header_for(&self, col: usize, name: &str) -> &Format {
        if col == 0 && name == ROW_ID_HEADER {
            &self.header_row_id
        } else {
            &self.header
        }
    }
}

impl Default for SheetFormats {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute per-column widths: the longest cell in the column, header
/// included, plus fixed padding
#[must_use]
pub fn plan_column_widths(table: &Table) -> Vec<usize> {
    let mut widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|name| name.chars().count())
        .collect();

    for row in table.rows() {
        for (col, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(cell.display_width());
            }
        }
    }

    for width in &mut widths {
        *width += WIDTH_PADDING;
    }
    widths
}

/// Apply the non-cell chrome to a worksheet: column widths and the freeze
/// boundary below row 2. Failures become warnings, never errors.
pub fn apply_sheet_chrome(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    table: &Table,
) -> Vec<FormatWarning> {
    let mut warnings = Vec::new();

    for (col, width) in plan_column_widths(table).iter().enumerate() {
        let result = u16::try_from(col)
            .map_err(|_| format!("column index overflow: {col}"))
            .and_then(|col_num| {
                worksheet
                    .set_column_width(col_num, *width as f64)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            });
        if let Err(detail) = result {
            warnings.push(FormatWarning {
                sheet: sheet_name.to_string(),
                detail,
            });
        }
    }

    // Rows 1-2 stay visible under scroll, whether or not row 2 is present
    if let Err(e) = worksheet.set_freeze_panes(2, 0) {
        warnings.push(FormatWarning {
            sheet: sheet_name.to_string(),
            detail: format!("freeze panes: {e}"),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn test_column_widths_include_header_and_padding() {
        let table = Table::from_rows(
            vec!["id", "description"],
            vec![vec!["1", "short"], vec!["2", "a longer value here"]],
        )
        .unwrap();

        let widths = plan_column_widths(&table);
        assert_eq!(widths, vec![2 + WIDTH_PADDING, 19 + WIDTH_PADDING]);
    }

    #[test]
    fn test_column_widths_count_cjk_chars_once() {
        let table = Table::new(
            vec!["技能".to_string()],
            vec![vec![CellValue::String("连招测试".to_string())]],
        )
        .unwrap();

        assert_eq!(plan_column_widths(&table), vec![4 + WIDTH_PADDING]);
    }

    #[test]
    fn test_header_format_selection() {
        let formats = SheetFormats::new();
        // Reserved name only counts in the first column
        assert!(std::ptr::eq(
            formats.header_for(0, ROW_ID_HEADER),
            &formats.header_row_id
        ));
        assert!(std::ptr::eq(
            formats.header_for(1, ROW_ID_HEADER),
            &formats.header
        ));
        assert!(std::ptr::eq(formats.header_for(0, "Name"), &formats.header));
    }
}
