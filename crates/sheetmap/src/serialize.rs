//! Conversion between property values and cell contents.

use crate::config::MapperConfig;
use crate::error::{DeserializationError, SerializationError};
use crate::options::{DateKind, StringKind};
use crate::property::PropertyDescriptor;
use crate::strings::StringIndexer;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetmap_common::{CellValue, ValueKind, serial_to_datetime};
use sheetmap_workbook::CellData;

/// Longest text a single cell may hold, in characters.
pub const MAX_TEXT_LEN: usize = 32_767;

/// Produces cell contents for property values and parses them back.
pub trait CellSerializer: Send + Sync {
    fn serialize(
        &self,
        value: CellValue,
        property: &PropertyDescriptor,
        strings: &mut StringIndexer,
    ) -> Result<CellData, SerializationError>;

    fn deserialize(
        &self,
        text: &str,
        property: &PropertyDescriptor,
    ) -> Result<CellValue, DeserializationError>;
}

/// Serializer for the built-in value kinds.
///
/// Properties without a string-kind or date-kind option fall back to the
/// kinds configured here.
#[derive(Debug, Clone, Default)]
pub struct StandardSerializer {
    string_kind: StringKind,
    date_kind: DateKind,
}

impl StandardSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self {
            string_kind: config.string_kind,
            date_kind: config.date_kind.clone(),
        }
    }

    fn string_kind(&self, property: &PropertyDescriptor) -> StringKind {
        property
            .options()
            .find::<StringKind>()
            .copied()
            .unwrap_or(self.string_kind)
    }

    fn date_kind<'a>(&'a self, property: &'a PropertyDescriptor) -> &'a DateKind {
        property
            .options()
            .find::<DateKind>()
            .unwrap_or(&self.date_kind)
    }

    fn temporal_cell(
        &self,
        value: CellValue,
        property: &PropertyDescriptor,
    ) -> Result<CellData, SerializationError> {
        let kind = property.kind();
        let Some(format) = self.date_kind(property).format_for(kind) else {
            // A serial is only written if it can be read back.
            return match value.as_serial_number() {
                Some(serial) if serial_to_datetime(serial).is_some() => {
                    Ok(CellData::from_value(CellValue::Number(serial)))
                }
                _ => Err(SerializationError::OutOfRange {
                    value: value.to_string(),
                }),
            };
        };
        let text = match value {
            CellValue::Date(d) => d.format(format).to_string(),
            CellValue::DateTime(dt) => dt.format(format).to_string(),
            CellValue::Time(t) => t.format(format).to_string(),
            other => other.to_string(),
        };
        Ok(CellData::from_value(CellValue::Text(text)))
    }

    fn parse_temporal(
        &self,
        text: &str,
        property: &PropertyDescriptor,
    ) -> Result<CellValue, String> {
        let kind = property.kind();
        let date_kind = self.date_kind(property);
        if let Some(format) = date_kind.format_for(kind) {
            let parsed = match kind {
                ValueKind::DateTime => NaiveDateTime::parse_from_str(text, format)
                    .map(CellValue::DateTime),
                ValueKind::Time => NaiveTime::parse_from_str(text, format).map(CellValue::Time),
                _ => NaiveDate::parse_from_str(text, format).map(CellValue::Date),
            };
            match parsed {
                Ok(value) => return Ok(value),
                Err(err) if text.parse::<f64>().is_err() => {
                    return Err(format!("does not match `{format}`: {err}"));
                }
                Err(_) => {}
            }
        }
        let serial: f64 = text
            .parse()
            .map_err(|_| "not a date serial number".to_string())?;
        let dt = serial_to_datetime(serial)
            .ok_or_else(|| format!("serial {serial} is out of range"))?;
        Ok(match kind {
            ValueKind::DateTime => CellValue::DateTime(dt),
            ValueKind::Time => CellValue::Time(dt.time()),
            _ => CellValue::Date(dt.date()),
        })
    }
}

fn parse_integer(text: &str) -> Result<i64, String> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(i);
    }
    let n: f64 = text.parse().map_err(|_| "not a number".to_string())?;
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err("not a whole number".to_string())
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        Ok(_) => Err("not a finite number".to_string()),
        Err(_) => Err("not a number".to_string()),
    }
}

fn parse_boolean(text: &str) -> Result<bool, String> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err("not a boolean".to_string()),
    }
}

impl CellSerializer for StandardSerializer {
    fn serialize(
        &self,
        value: CellValue,
        property: &PropertyDescriptor,
        strings: &mut StringIndexer,
    ) -> Result<CellData, SerializationError> {
        let Some(kind) = value.kind() else {
            return if property.nullable() {
                Ok(CellData::default())
            } else {
                Err(SerializationError::UnexpectedEmpty)
            };
        };
        if kind != property.kind() {
            return Err(SerializationError::KindMismatch {
                expected: property.kind(),
                found: kind.to_string(),
            });
        }

        match value {
            CellValue::Number(n) if !n.is_finite() => Err(SerializationError::NonFinite(n)),
            CellValue::Text(text) => {
                let len = text.chars().count();
                if len > MAX_TEXT_LEN {
                    return Err(SerializationError::TextTooLong {
                        len,
                        max: MAX_TEXT_LEN,
                    });
                }
                Ok(match self.string_kind(property) {
                    StringKind::Shared if !text.is_empty() => {
                        let idx = strings.add(&text);
                        CellData::shared_text(text, idx)
                    }
                    _ => CellData::from_value(text),
                })
            }
            value if kind.is_temporal() => self.temporal_cell(value, property),
            value => Ok(CellData::from_value(value)),
        }
    }

    fn deserialize(
        &self,
        text: &str,
        property: &PropertyDescriptor,
    ) -> Result<CellValue, DeserializationError> {
        let expected = property.kind();
        let parsed = match expected {
            ValueKind::Integer => parse_integer(text).map(CellValue::Int),
            ValueKind::Number => parse_number(text).map(CellValue::Number),
            ValueKind::Text => Ok(CellValue::Text(text.to_string())),
            ValueKind::Boolean => parse_boolean(text).map(CellValue::Boolean),
            ValueKind::Date | ValueKind::DateTime | ValueKind::Time => {
                self.parse_temporal(text, property)
            }
        };
        parsed.map_err(|reason| DeserializationError {
            text: text.to_string(),
            expected,
            reason,
        })
    }
}
