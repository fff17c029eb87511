use crate::error::{MapError, OptionTarget, Result};
use crate::options::{DateKind, ReadingFailurePolicy, StringKind};
use serde::{Deserialize, Serialize};

/// Session-wide defaults used where a map or property sets no option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Header row for maps without a header-row option.
    pub default_header_row: u32,
    pub failure_policy: ReadingFailurePolicy,
    /// Rendering of text cells, header labels included.
    pub string_kind: StringKind,
    pub date_kind: DateKind,
    /// Trim body cell text before coercion on read.
    pub trim_cells: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            default_header_row: 1,
            failure_policy: ReadingFailurePolicy::Continue,
            string_kind: StringKind::Shared,
            date_kind: DateKind::Text,
            trim_cells: false,
        }
    }
}

impl MapperConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.default_header_row == 0 {
            return Err(MapError::InvalidHeaderRow {
                target: OptionTarget::Resource("configuration".to_string()),
            });
        }
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = MapperConfig::from_json_str(r#"{ "trim_cells": true }"#).unwrap();
        assert!(config.trim_cells);
        assert_eq!(config.default_header_row, 1);
        assert_eq!(config.string_kind, StringKind::Shared);
    }

    #[test]
    fn nested_options_deserialize() {
        let config = MapperConfig::from_json_str(
            r#"{
                "default_header_row": 2,
                "failure_policy": "exit_on_first_failure",
                "string_kind": "inline",
                "date_kind": { "kind": "formatted", "format": "%d/%m/%Y" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_header_row, 2);
        assert_eq!(config.failure_policy, ReadingFailurePolicy::ExitOnFirstFailure);
        assert_eq!(config.string_kind, StringKind::Inline);
        assert_eq!(
            config.date_kind,
            DateKind::Formatted {
                format: "%d/%m/%Y".into()
            }
        );
    }

    #[test]
    fn invalid_json_and_zero_header_row_fail() {
        assert!(matches!(
            MapperConfig::from_json_str("{").unwrap_err(),
            MapError::Config(_)
        ));
        assert!(matches!(
            MapperConfig::from_json_str(r#"{ "default_header_row": 0 }"#).unwrap_err(),
            MapError::InvalidHeaderRow { .. }
        ));
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let config = MapperConfig {
            date_kind: DateKind::Serial,
            ..MapperConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(MapperConfig::from_json_str(&json).unwrap(), config);
    }
}
