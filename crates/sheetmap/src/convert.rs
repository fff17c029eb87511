//! Conversion between typed resource fields and [`CellValue`].

use crate::error::ConversionError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetmap_common::{CellValue, ValueKind};
use std::collections::BTreeMap;

/// A Rust type that can be stored in a single cell.
pub trait CellType: Sized {
    const KIND: ValueKind;
    /// Whether [`CellValue::Empty`] is a legal value for this type.
    const NULLABLE: bool = false;

    fn into_cell(self) -> CellValue;

    fn from_cell(value: CellValue) -> Result<Self, ConversionError>;
}

fn kind_error(expected: ValueKind, value: &CellValue) -> ConversionError {
    ConversionError::Kind {
        expected,
        found: value
            .kind()
            .map_or_else(|| "an empty cell".to_string(), |k| k.to_string()),
    }
}

impl CellType for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn into_cell(self) -> CellValue {
        CellValue::Int(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Int(i) => Ok(i),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

macro_rules! narrow_int {
    ($ty:ty, $name:literal) => {
        impl CellType for $ty {
            const KIND: ValueKind = ValueKind::Integer;

            fn into_cell(self) -> CellValue {
                CellValue::Int(i64::from(self))
            }

            fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
                let i = i64::from_cell(value)?;
                <$ty>::try_from(i).map_err(|_| ConversionError::Range {
                    value: i.to_string(),
                    target: $name,
                })
            }
        }
    };
}

narrow_int!(i32, "i32");
narrow_int!(u32, "u32");

impl CellType for f64 {
    const KIND: ValueKind = ValueKind::Number;

    fn into_cell(self) -> CellValue {
        CellValue::Number(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Number(n) => Ok(n),
            CellValue::Int(i) => Ok(i as f64),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl CellType for String {
    const KIND: ValueKind = ValueKind::Text;

    fn into_cell(self) -> CellValue {
        CellValue::Text(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Text(s) => Ok(s),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl CellType for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn into_cell(self) -> CellValue {
        CellValue::Boolean(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Boolean(b) => Ok(b),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl CellType for NaiveDate {
    const KIND: ValueKind = ValueKind::Date;

    fn into_cell(self) -> CellValue {
        CellValue::Date(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Date(d) => Ok(d),
            CellValue::DateTime(dt) => Ok(dt.date()),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl CellType for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn into_cell(self) -> CellValue {
        CellValue::DateTime(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::DateTime(dt) => Ok(dt),
            CellValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl CellType for NaiveTime {
    const KIND: ValueKind = ValueKind::Time;

    fn into_cell(self) -> CellValue {
        CellValue::Time(self)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Time(t) => Ok(t),
            other => Err(kind_error(Self::KIND, &other)),
        }
    }
}

impl<V: CellType> CellType for Option<V> {
    const KIND: ValueKind = V::KIND;
    const NULLABLE: bool = true;

    fn into_cell(self) -> CellValue {
        self.map_or(CellValue::Empty, V::into_cell)
    }

    fn from_cell(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Empty => Ok(None),
            other => V::from_cell(other).map(Some),
        }
    }
}

/// Named property values handed to an explicit constructor.
///
/// Values are keyed by the property's member name. Properties whose cell was
/// absent (and allowed to be) are not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: BTreeMap<String, CellValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values.get(name)
    }

    /// Remove and convert the value of `name`.
    ///
    /// A missing value converts as [`CellValue::Empty`], so nullable fields
    /// receive `None` and everything else reports [`ConversionError::Missing`].
    pub fn take<V: CellType>(&mut self, name: &str) -> Result<V, ConversionError> {
        let value = self.values.remove(name).unwrap_or_default();
        if value.is_empty() && !V::NULLABLE {
            return Err(ConversionError::Missing(name.to_string()));
        }
        V::from_cell(value).map_err(|err| ConversionError::Property {
            property: name.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_integers_check_range() {
        assert_eq!(u32::from_cell(CellValue::Int(7)).unwrap(), 7);
        let err = u32::from_cell(CellValue::Int(-1)).unwrap_err();
        assert!(matches!(err, ConversionError::Range { target: "u32", .. }));
    }

    #[test]
    fn option_maps_empty_to_none() {
        assert_eq!(Option::<String>::from_cell(CellValue::Empty).unwrap(), None);
        assert_eq!(Option::<i64>::None.into_cell(), CellValue::Empty);
        assert!(<Option<bool> as CellType>::NULLABLE);
        assert_eq!(<Option<bool> as CellType>::KIND, ValueKind::Boolean);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let err = bool::from_cell(CellValue::from("yes")).unwrap_err();
        assert_eq!(
            err,
            ConversionError::Kind {
                expected: ValueKind::Boolean,
                found: "text".into()
            }
        );
    }

    #[test]
    fn field_values_take() {
        let mut values = FieldValues::new();
        values.insert("Id", CellValue::Int(4));
        values.insert("Name", CellValue::from("Ada"));

        assert_eq!(values.take::<i64>("Id").unwrap(), 4);
        assert!(!values.contains("Id"));
        assert_eq!(values.take::<Option<String>>("Nick").unwrap(), None);
        assert_eq!(
            values.take::<i64>("Age").unwrap_err(),
            ConversionError::Missing("Age".into())
        );
        let err = values.take::<i64>("Name").unwrap_err();
        assert!(matches!(err, ConversionError::Property { ref property, .. } if property == "Name"));
    }
}
