use crate::error::IoError;
use crate::traits::{CellData, RowCells, SheetReader, SheetWriter};
use sheetmap_common::{CellAddress, CellValue, MAX_COLUMN, MAX_ROW};
use std::collections::BTreeMap;

/// In-memory sheet that is both a forward-only cursor and a row reader.
///
/// Semantics:
/// - Only cells that were written (or seeded) are stored.
/// - Reading reports a cell's display text. A cell holding
///   [`CellValue::Empty`] counts as no cell; written empty text is reported.
/// - The write cursor and the read position are independent.
#[derive(Clone, Debug)]
pub struct MemorySheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellData>,
    shared_strings: Vec<String>,
    cursor: CellAddress,
    /// Last row handed out by the reader.
    read_after: u32,
}

impl Default for MemorySheet {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::named("Sheet1")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            shared_strings: Vec::new(),
            cursor: CellAddress::new(1, 1),
            read_after: 0,
        }
    }

    /// Seed a sheet from text rows starting at `A1`; empty strings are skipped.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sheet = Self::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, text) in row.into_iter().enumerate() {
                let text = text.as_ref();
                if !text.is_empty() {
                    sheet.set_cell(r as u32 + 1, c as u32 + 1, CellValue::from(text));
                }
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Place a value directly, bypassing the cursor.
    pub fn set_cell(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.cells.insert((row, col), CellData::from_value(value));
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }

    /// Dense text of one row from column 1 to its last stored cell.
    pub fn row_text(&self, row: u32) -> Vec<String> {
        let cells: Vec<(u32, String)> = self
            .cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|(&(_, col), data)| (col, data.text()))
            .collect();
        let width = cells.last().map(|(col, _)| *col).unwrap_or(0);
        let mut out = vec![String::new(); width as usize];
        for (col, text) in cells {
            out[col as usize - 1] = text;
        }
        out
    }

    pub fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }

    /// `(max_row, max_col)` over stored cells, or `None` when empty.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let max_row = self.cells.keys().map(|(r, _)| *r).max()?;
        let max_col = self.cells.keys().map(|(_, c)| *c).max()?;
        Some((max_row, max_col))
    }

    /// Restart reading from the top of the sheet.
    pub fn rewind(&mut self) {
        self.read_after = 0;
    }

    fn collect_row(&self, row: u32) -> RowCells {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .filter(|(_, data)| data.value != CellValue::Empty)
            .map(|(&(_, col), data)| (col, data.text()))
            .collect()
    }
}

impl SheetWriter for MemorySheet {
    type Error = IoError;

    fn row(&self) -> u32 {
        self.cursor.row
    }

    fn column(&self) -> u32 {
        self.cursor.col
    }

    fn advance_to_row(&mut self, row: u32) -> Result<(), IoError> {
        let to = CellAddress::new(row, 1);
        if row < self.cursor.row {
            return Err(IoError::backwards(self.cursor, to));
        }
        if row > MAX_ROW {
            return Err(IoError::OutOfBounds { address: to });
        }
        if row > self.cursor.row {
            self.cursor = to;
        }
        Ok(())
    }

    fn advance_to_column(&mut self, col: u32) -> Result<(), IoError> {
        let to = CellAddress::new(self.cursor.row, col);
        if col < self.cursor.col {
            return Err(IoError::backwards(self.cursor, to));
        }
        if col > MAX_COLUMN {
            return Err(IoError::OutOfBounds { address: to });
        }
        self.cursor.col = col;
        Ok(())
    }

    fn write_cell(&mut self, data: CellData) -> Result<(), IoError> {
        if self.cursor.col > MAX_COLUMN {
            return Err(IoError::OutOfBounds {
                address: self.cursor,
            });
        }
        self.cells.insert((self.cursor.row, self.cursor.col), data);
        self.cursor.col += 1;
        Ok(())
    }

    fn write_shared_strings(&mut self, strings: &[String]) -> Result<(), IoError> {
        self.shared_strings = strings.to_vec();
        Ok(())
    }
}

impl SheetReader for MemorySheet {
    type Error = IoError;

    fn read_row(&mut self, row: u32) -> Result<Option<RowCells>, IoError> {
        self.read_after = row;
        let cells = self.collect_row(row);
        Ok((!cells.is_empty()).then_some(cells))
    }

    fn next_row(&mut self) -> Result<Option<(u32, RowCells)>, IoError> {
        loop {
            let Some(row) = self
                .cells
                .range((self.read_after.saturating_add(1), 0)..)
                .map(|(&(row, _), _)| row)
                .next()
            else {
                return Ok(None);
            };
            self.read_after = row;
            let cells = self.collect_row(row);
            if !cells.is_empty() {
                return Ok(Some((row, cells)));
            }
        }
    }
}
