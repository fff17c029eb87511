use sheetmap_common::{CellAddress, CellValue};
use std::collections::BTreeMap;

pub type StyleId = u32;

/// Non-empty cell text of one row keyed by 1-based column number.
pub type RowCells = BTreeMap<u32, String>;

/// Everything a backend needs to materialise one cell.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CellData {
    pub value: CellValue,
    pub style: Option<StyleId>,
    /// Index into the shared-string table when the text was deduplicated.
    pub shared_string: Option<usize>,
}

impl CellData {
    pub fn from_value(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: None,
            shared_string: None,
        }
    }

    pub fn shared_text(text: impl Into<String>, index: usize) -> Self {
        Self {
            value: CellValue::Text(text.into()),
            style: None,
            shared_string: Some(index),
        }
    }

    pub fn with_style(mut self, style: Option<StyleId>) -> Self {
        self.style = style;
        self
    }

    /// Text a plain-text backend stores for this cell.
    pub fn text(&self) -> String {
        self.value.to_string()
    }
}

/// Forward-only page cursor.
///
/// Positions are 1-based and start at `A1`. Rows and columns only ever move
/// forward: advancing to the current position is a no-op, advancing to an
/// earlier one is an error. Moving to a later row resets the column to 1.
pub trait SheetWriter {
    type Error: std::error::Error + Send + Sync + 'static;

    fn row(&self) -> u32;
    fn column(&self) -> u32;

    fn position(&self) -> CellAddress {
        CellAddress::new(self.row(), self.column())
    }

    fn advance_to_row(&mut self, row: u32) -> Result<(), Self::Error>;

    fn advance_to_column(&mut self, col: u32) -> Result<(), Self::Error>;

    /// Write one cell at the cursor and move one column to the right.
    fn write_cell(&mut self, data: CellData) -> Result<(), Self::Error>;

    /// Receive the deduplicated string table once a page is complete.
    fn write_shared_strings(&mut self, strings: &[String]) -> Result<(), Self::Error> {
        let _ = strings;
        Ok(())
    }
}

/// Row-at-a-time raw reader.
pub trait SheetReader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read one row (typically the header) and position the reader after it.
    ///
    /// Returns `None` when the row holds no cells at all.
    fn read_row(&mut self, row: u32) -> Result<Option<RowCells>, Self::Error>;

    /// Next non-empty row after the last row read, or `None` at end of data.
    fn next_row(&mut self) -> Result<Option<(u32, RowCells)>, Self::Error>;
}
