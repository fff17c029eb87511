//! Session-scoped shared string table.

use crate::error::{MapError, Result};
use rustc_hash::FxHashMap;
use sheetmap_workbook::SheetWriter;

/// Assigns stable indices to distinct text values of one write session.
///
/// Indices are 0-based and follow first insertion. A new session (or
/// [`StringIndexer::clear`]) is needed for every output target.
#[derive(Debug, Default, Clone)]
pub struct StringIndexer {
    strings: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl StringIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `text`, returning the existing index when it was already added.
    pub fn add(&mut self, text: &str) -> usize {
        if let Some(&idx) = self.index.get(text) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(text.to_string());
        self.index.insert(text.to_string(), idx);
        idx
    }

    pub fn lookup(&self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Err(MapError::InvalidArgument(
                "cannot look up empty text in the string table".to_string(),
            ));
        }
        self.index
            .get(text)
            .copied()
            .ok_or_else(|| MapError::StringNotFound(text.to_string()))
    }

    pub fn clear(&mut self) {
        self.strings.clear();
        self.index.clear();
    }

    /// Indexed text in insertion order.
    pub fn resources(&self) -> &[String] {
        &self.strings
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Hand the table to `sink`. Nothing is written for an empty session.
    pub fn emit<W: SheetWriter>(&self, sink: &mut W) -> Result<()> {
        if self.strings.is_empty() {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(count = self.strings.len(), "emitting shared strings");
        sink.write_shared_strings(&self.strings)
            .map_err(MapError::backend)
    }
}
