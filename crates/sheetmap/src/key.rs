use sheetmap_common::column_to_letters;
use std::fmt;

/// Header text of a property plus its optional fixed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceMapKey {
    name: String,
    number: Option<u32>,
}

impl ResourceMapKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
        }
    }

    /// Pin the key to a 1-based column.
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed column, or `None` when the column is assigned automatically.
    pub fn number(&self) -> Option<u32> {
        self.number
    }
}

impl fmt::Display for ResourceMapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{} ({})", self.name, column_to_letters(n)),
            None => f.write_str(&self.name),
        }
    }
}
