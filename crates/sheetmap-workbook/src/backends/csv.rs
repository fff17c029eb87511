use crate::error::IoError;
use crate::traits::{CellData, RowCells, SheetReader, SheetWriter};
use sheetmap_common::{CellAddress, MAX_COLUMN};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvTrim {
    #[default]
    None,
    All,
}

#[derive(Clone, Debug)]
pub struct CsvReadOptions {
    /// Field delimiter as a single byte. Use `b'\t'` for TSV.
    pub delimiter: u8,
    pub trim: CsvTrim,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: CsvTrim::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvNewline {
    #[default]
    Lf,
    Crlf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvQuoteStyle {
    #[default]
    Necessary,
    Always,
    NonNumeric,
}

#[derive(Clone, Debug)]
pub struct CsvWriteOptions {
    /// Field delimiter as a single byte. Use `b'\t'` for TSV.
    pub delimiter: u8,
    pub newline: CsvNewline,
    pub quote_style: CsvQuoteStyle,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            newline: CsvNewline::Lf,
            quote_style: CsvQuoteStyle::Necessary,
        }
    }
}

/// Streaming CSV cursor.
///
/// Semantics:
/// - Record `n` of the output is sheet row `n`; skipped rows are written as a
///   single empty field so row numbers survive a round trip.
/// - Skipped columns become empty fields.
/// - Styles and shared strings have no CSV representation and are dropped.
pub struct CsvWriter<W: Write> {
    inner: csv::Writer<W>,
    cursor: CellAddress,
    current: Vec<String>,
    /// Rows already handed to the csv writer.
    flushed_rows: u32,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, CsvWriteOptions::default())
    }

    pub fn with_options(inner: W, options: CsvWriteOptions) -> Self {
        let terminator = match options.newline {
            CsvNewline::Lf => csv::Terminator::Any(b'\n'),
            CsvNewline::Crlf => csv::Terminator::CRLF,
        };
        let quote_style = match options.quote_style {
            CsvQuoteStyle::Necessary => csv::QuoteStyle::Necessary,
            CsvQuoteStyle::Always => csv::QuoteStyle::Always,
            CsvQuoteStyle::NonNumeric => csv::QuoteStyle::NonNumeric,
        };
        let inner = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(terminator)
            .quote_style(quote_style)
            .flexible(true)
            .from_writer(inner);
        Self {
            inner,
            cursor: CellAddress::new(1, 1),
            current: Vec::new(),
            flushed_rows: 0,
        }
    }

    /// Flush the row under the cursor and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, IoError> {
        if !self.current.is_empty() {
            self.emit_current()?;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = self.flushed_rows, "csv output finished");
        self.inner
            .into_inner()
            .map_err(|err| IoError::Io(err.into_error()))
    }

    fn emit_current(&mut self) -> Result<(), IoError> {
        // Catch up on rows that were skipped without any cell being written.
        while self.flushed_rows + 1 < self.cursor.row {
            self.inner.write_record([""])?;
            self.flushed_rows += 1;
        }
        if self.current.is_empty() {
            self.inner.write_record([""])?;
        } else {
            self.inner.write_record(&self.current)?;
        }
        self.current.clear();
        self.flushed_rows += 1;
        Ok(())
    }
}

impl CsvWriter<Vec<u8>> {
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }
}

impl CsvWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> SheetWriter for CsvWriter<W> {
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
        if row > self.cursor.row {
            if !self.current.is_empty() {
                self.emit_current()?;
            }
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
        let idx = (self.cursor.col - 1) as usize;
        if self.current.len() < idx {
            self.current.resize(idx, String::new());
        }
        self.current.push(data.text());
        self.cursor.col += 1;
        Ok(())
    }
}

/// CSV source read eagerly into memory; record `n` is sheet row `n`.
///
/// CSV cannot tell a skipped column from empty text, so every field of a
/// record is reported, empty ones included. A record whose fields are all
/// empty is a blank row.
#[derive(Clone, Debug, Default)]
pub struct CsvReader {
    rows: Vec<Vec<String>>,
    read_after: u32,
}

impl CsvReader {
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        Self::open_path_with_options(path, CsvReadOptions::default())
    }

    pub fn open_path_with_options<P: AsRef<Path>>(
        path: P,
        options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let file = File::open(path)?;
        Self::from_reader_with_options(BufReader::new(file), options)
    }

    pub fn open_bytes(data: Vec<u8>) -> Result<Self, IoError> {
        Self::from_reader_with_options(data.as_slice(), CsvReadOptions::default())
    }

    pub fn from_reader_with_options<R: Read>(
        reader: R,
        options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let trim = match options.trim {
            CsvTrim::None => csv::Trim::None,
            CsvTrim::All => csv::Trim::All,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .trim(trim)
            .from_reader(reader);
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = rows.len(), "csv source loaded");
        Ok(Self { rows, read_after: 0 })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cells(&self, row: u32) -> Option<RowCells> {
        let fields = self.rows.get(row.checked_sub(1)? as usize)?;
        if fields.iter().all(String::is_empty) {
            return None;
        }
        Some(
            fields
                .iter()
                .enumerate()
                .map(|(idx, text)| (idx as u32 + 1, text.clone()))
                .collect(),
        )
    }
}

impl SheetReader for CsvReader {
    type Error = IoError;

    fn read_row(&mut self, row: u32) -> Result<Option<RowCells>, IoError> {
        self.read_after = row;
        Ok(self.cells(row))
    }

    fn next_row(&mut self) -> Result<Option<(u32, RowCells)>, IoError> {
        while (self.read_after as usize) < self.rows.len() {
            self.read_after += 1;
            if let Some(cells) = self.cells(self.read_after) {
                return Ok(Some((self.read_after, cells)));
            }
        }
        Ok(None)
    }
}
