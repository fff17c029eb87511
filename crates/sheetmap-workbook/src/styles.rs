//! Style key resolution.
//!
//! Maps carry style *keys*; the sheet needs numeric style ids. A
//! [`StyleResolver`] bridges the two. [`StyleSheet`] deduplicates identical
//! formats so several keys can share one id.

use crate::traits::StyleId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub trait StyleResolver {
    fn resolve(&self, key: &str) -> Option<StyleId>;
}

/// Resolver for sessions that do not use styles; every lookup misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStyles;

impl StyleResolver for NoStyles {
    fn resolve(&self, _key: &str) -> Option<StyleId> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CellFormat {
    pub number_format: Option<String>,
    pub bold: bool,
    pub italic: bool,
    /// Fill colour as `RRGGBB`.
    pub fill: Option<String>,
    pub horizontal: Option<HorizontalAlignment>,
}

#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    formats: Vec<CellFormat>,
    by_format: FxHashMap<CellFormat, StyleId>,
    by_key: FxHashMap<String, StyleId>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `format` under `key`, reusing the id of an identical format.
    /// Re-registering a key points it at the new format.
    pub fn register(&mut self, key: impl Into<String>, format: CellFormat) -> StyleId {
        let id = match self.by_format.get(&format) {
            Some(id) => *id,
            None => {
                let id = self.formats.len() as StyleId;
                self.formats.push(format.clone());
                self.by_format.insert(format, id);
                id
            }
        };
        self.by_key.insert(key.into(), id);
        id
    }

    pub fn format(&self, id: StyleId) -> Option<&CellFormat> {
        self.formats.get(id as usize)
    }

    pub fn formats(&self) -> &[CellFormat] {
        &self.formats
    }
}

impl StyleResolver for StyleSheet {
    fn resolve(&self, key: &str) -> Option<StyleId> {
        self.by_key.get(key).copied()
    }
}
