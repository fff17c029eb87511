use sheetmap_common::CellAddress;
use thiserror::Error;

/// Errors raised by document backends.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Sheets are written strictly forward; a cursor can never revisit a cell.
    #[error("cursor cannot move backwards from {from} to {to}")]
    CursorBackwards { from: CellAddress, to: CellAddress },

    #[error("position {address} is outside the sheet bounds")]
    OutOfBounds { address: CellAddress },
}

impl IoError {
    pub fn backwards(from: CellAddress, to: CellAddress) -> Self {
        IoError::CursorBackwards { from, to }
    }
}
