//! Column assignment for the properties of a resource map.
//!
//! Explicit column numbers are reserved first. The remaining properties take
//! the smallest free numbers in declaration order, and the result is sorted by
//! column so header and body rows can be emitted left to right.

use crate::error::{MapError, Result};
use crate::key::ResourceMapKey;
use rustc_hash::FxHashMap;
use sheetmap_common::MAX_COLUMN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// 1-based column number.
    pub column: u32,
    /// Declaration index of the property within its map.
    pub property: usize,
    pub name: String,
    /// Whether the column came from the property itself.
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLayout {
    columns: Vec<ResolvedColumn>,
}

impl ColumnLayout {
    pub fn resolve<'a, I>(map: &str, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ResourceMapKey>,
    {
        let keys: Vec<&ResourceMapKey> = keys.into_iter().collect();
        let mut reserved: FxHashMap<u32, usize> = FxHashMap::default();
        let mut columns = Vec::with_capacity(keys.len());

        for (idx, key) in keys.iter().enumerate() {
            let Some(column) = key.number() else {
                continue;
            };
            if column == 0 || column > MAX_COLUMN {
                return Err(MapError::ColumnOutOfRange {
                    property: key.name().to_string(),
                    column,
                    max: MAX_COLUMN,
                });
            }
            if let Some(&first) = reserved.get(&column) {
                return Err(MapError::DuplicateColumn {
                    map: map.to_string(),
                    column,
                    first: keys[first].name().to_string(),
                    second: key.name().to_string(),
                });
            }
            reserved.insert(column, idx);
            columns.push(ResolvedColumn {
                column,
                property: idx,
                name: key.name().to_string(),
                explicit: true,
            });
        }

        let mut next = 1u32;
        for (idx, key) in keys.iter().enumerate() {
            if key.number().is_some() {
                continue;
            }
            while reserved.contains_key(&next) {
                next += 1;
            }
            if next > MAX_COLUMN {
                return Err(MapError::ColumnOutOfRange {
                    property: key.name().to_string(),
                    column: next,
                    max: MAX_COLUMN,
                });
            }
            columns.push(ResolvedColumn {
                column: next,
                property: idx,
                name: key.name().to_string(),
                explicit: false,
            });
            next += 1;
        }

        columns.sort_by_key(|c| c.column);
        Ok(Self { columns })
    }

    /// Columns in emission order.
    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column assigned to the property declared at `property`.
    pub fn column_of(&self, property: usize) -> Option<u32> {
        self.columns
            .iter()
            .find(|c| c.property == property)
            .map(|c| c.column)
    }

    pub fn by_name(&self, name: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl<'a> IntoIterator for &'a ColumnLayout {
    type Item = &'a ResolvedColumn;
    type IntoIter = std::slice::Iter<'a, ResolvedColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(decls: &[(&str, Option<u32>)]) -> Vec<ResourceMapKey> {
        decls.iter()
            .map(|(name, n)| {
                let key = ResourceMapKey::new(*name);
                match n {
                    Some(n) => key.with_number(*n),
                    None => key,
                }
            })
            .collect()
    }

    #[test]
    fn auto_columns_skip_reserved_numbers() {
        let keys = keys(&[
            ("a", None),
            ("x", Some(1)),
            ("b", None),
            ("y", Some(3)),
            ("c", None),
        ]);
        let layout = ColumnLayout::resolve("m", &keys).unwrap();
        let got: Vec<(u32, &str, bool)> = layout
            .iter()
            .map(|c| (c.column, c.name.as_str(), c.explicit))
            .collect();
        assert_eq!(
            got,
            vec![
                (1, "x", true),
                (2, "a", false),
                (3, "y", true),
                (4, "b", false),
                (5, "c", false),
            ]
        );
        assert_eq!(layout.column_of(0), Some(2));
        assert_eq!(layout.by_name("c").map(|c| c.property), Some(4));
    }

    #[test]
    fn sparse_explicit_columns_leave_gaps() {
        let keys = keys(&[("Id", Some(2)), ("Name", Some(5))]);
        let layout = ColumnLayout::resolve("m", &keys).unwrap();
        let cols: Vec<u32> = layout.iter().map(|c| c.column).collect();
        assert_eq!(cols, vec![2, 5]);
    }

    #[test]
    fn duplicate_explicit_column_is_rejected() {
        let keys = keys(&[("Id", Some(2)), ("Code", Some(2))]);
        match ColumnLayout::resolve("m", &keys).unwrap_err() {
            MapError::DuplicateColumn {
                column,
                first,
                second,
                ..
            } => {
                assert_eq!(column, 2);
                assert_eq!(first, "Id");
                assert_eq!(second, "Code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn column_bounds_are_checked() {
        let zero = keys(&[("Id", Some(0))]);
        assert!(matches!(
            ColumnLayout::resolve("m", &zero).unwrap_err(),
            MapError::ColumnOutOfRange { column: 0, .. }
        ));
        let wide = keys(&[("Id", Some(MAX_COLUMN + 1))]);
        assert!(ColumnLayout::resolve("m", &wide).is_err());

        let full = keys(&[("Id", Some(MAX_COLUMN)), ("Auto", None)]);
        assert!(ColumnLayout::resolve("m", &full).is_ok());
    }
}
