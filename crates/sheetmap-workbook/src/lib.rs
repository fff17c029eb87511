//! Document layer for sheetmap.
//!
//! The mapping core never touches a file format directly. It talks to a
//! forward-only [`SheetWriter`] cursor when writing, a row-at-a-time
//! [`SheetReader`] when reading, and a [`StyleResolver`] when a style key has
//! to become a concrete style id. This crate defines those seams and ships an
//! in-memory backend plus a CSV backend.

pub mod backends;
pub mod error;
pub mod styles;
pub mod traits;

#[cfg(feature = "csv")]
pub use backends::csv::{
    CsvNewline, CsvQuoteStyle, CsvReadOptions, CsvReader, CsvTrim, CsvWriteOptions, CsvWriter,
};
pub use backends::memory::MemorySheet;
pub use error::IoError;
pub use styles::{CellFormat, HorizontalAlignment, NoStyles, StyleResolver, StyleSheet};
pub use traits::{CellData, RowCells, SheetReader, SheetWriter, StyleId};

// Re-export for convenience
pub use sheetmap_common::{CellAddress, CellValue};
