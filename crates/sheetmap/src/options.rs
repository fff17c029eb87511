//! Typed option store attached to resource and property maps.
//!
//! Every option payload is its own type tied to one [`OptionKind`] through
//! [`MapExtension`]. A store holds at most one entry per kind and is validated
//! once, when the owning map is built; afterwards it is read-only.

use crate::error::{MapError, OptionTarget, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use sheetmap_common::{CellValue, ValueKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    HeaderRow,
    ReadingFailurePolicy,
    DefaultReadingResolution,
    DefaultValue,
    Optional,
    HeaderStyle,
    BodyStyle,
    StringKind,
    DateKind,
}

/// Which maps an option may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    Resource,
    Property,
    Both,
}

impl OptionScope {
    fn admits_resource(self) -> bool {
        matches!(self, OptionScope::Resource | OptionScope::Both)
    }

    fn admits_property(self) -> bool {
        matches!(self, OptionScope::Property | OptionScope::Both)
    }
}

/// Row holding the header labels (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow(pub u32);

/// What the reader does once a data row fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingFailurePolicy {
    /// Keep scanning and collect every failure.
    #[default]
    Continue,
    /// Stop at the first failed row.
    ExitOnFirstFailure,
}

bitflags! {
    /// Conditions under which a property's default value replaces what the
    /// sheet provides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ReadingResolution: u8 {
        const MISSING_HEADER = 1;
        const INVALID_HEADER = 1 << 1;
        const MISSING_VALUE = 1 << 2;
        const INVALID_VALUE = 1 << 3;
    }
}

impl Default for ReadingResolution {
    fn default() -> Self {
        ReadingResolution::MISSING_VALUE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultReadingResolution(pub ReadingResolution);

/// Value substituted when the sheet does not provide a usable one.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue(pub CellValue);

/// Marks a property as not required in the header, the body, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optional {
    Header,
    Body,
    Both,
}

impl Optional {
    pub fn covers_header(self) -> bool {
        matches!(self, Optional::Header | Optional::Both)
    }

    pub fn covers_body(self) -> bool {
        matches!(self, Optional::Body | Optional::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderStyle(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyStyle(pub String);

/// How text cells are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringKind {
    /// Deduplicated through the session's string table.
    #[default]
    Shared,
    /// Stored in the cell itself.
    Inline,
}

/// How date and time cells are emitted and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DateKind {
    /// Excel serial number (1900 date system).
    Serial,
    /// ISO-8601 text in the layout of the value's kind.
    #[default]
    Text,
    /// Text in a caller-supplied `chrono` format.
    Formatted { format: String },
}

impl DateKind {
    pub fn format_for(&self, kind: ValueKind) -> Option<&str> {
        match self {
            DateKind::Serial => None,
            DateKind::Formatted { format } => Some(format.as_str()),
            DateKind::Text => Some(match kind {
                ValueKind::DateTime => "%Y-%m-%dT%H:%M:%S",
                ValueKind::Time => "%H:%M:%S",
                _ => "%Y-%m-%d",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapOption {
    HeaderRow(HeaderRow),
    ReadingFailurePolicy(ReadingFailurePolicy),
    DefaultReadingResolution(DefaultReadingResolution),
    DefaultValue(DefaultValue),
    Optional(Optional),
    HeaderStyle(HeaderStyle),
    BodyStyle(BodyStyle),
    StringKind(StringKind),
    DateKind(DateKind),
}

/// Links an option payload type to its tag, scope, and type constraint.
pub trait MapExtension: Into<MapOption> {
    const KIND: OptionKind;
    const SCOPE: OptionScope;

    /// Property value kinds this option accepts; empty means any.
    fn allowed_types() -> &'static [ValueKind] {
        &[]
    }

    fn from_option(option: &MapOption) -> Option<&Self>;
}

macro_rules! map_extension {
    ($ty:ident, $scope:ident) => {
        map_extension!($ty, $scope, []);
    };
    ($ty:ident, $scope:ident, [$($allowed:ident),*]) => {
        impl From<$ty> for MapOption {
            fn from(value: $ty) -> Self {
                MapOption::$ty(value)
            }
        }

        impl MapExtension for $ty {
            const KIND: OptionKind = OptionKind::$ty;
            const SCOPE: OptionScope = OptionScope::$scope;

            fn allowed_types() -> &'static [ValueKind] {
                &[$(ValueKind::$allowed),*]
            }

            fn from_option(option: &MapOption) -> Option<&Self> {
                match option {
                    MapOption::$ty(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

map_extension!(HeaderRow, Resource);
map_extension!(ReadingFailurePolicy, Resource);
map_extension!(DefaultReadingResolution, Both);
map_extension!(DefaultValue, Property);
map_extension!(Optional, Property);
map_extension!(HeaderStyle, Both);
map_extension!(BodyStyle, Both);
map_extension!(StringKind, Property, [Text]);
map_extension!(DateKind, Property, [Date, DateTime, Time]);

impl MapOption {
    pub fn kind(&self) -> OptionKind {
        match self {
            MapOption::HeaderRow(_) => OptionKind::HeaderRow,
            MapOption::ReadingFailurePolicy(_) => OptionKind::ReadingFailurePolicy,
            MapOption::DefaultReadingResolution(_) => OptionKind::DefaultReadingResolution,
            MapOption::DefaultValue(_) => OptionKind::DefaultValue,
            MapOption::Optional(_) => OptionKind::Optional,
            MapOption::HeaderStyle(_) => OptionKind::HeaderStyle,
            MapOption::BodyStyle(_) => OptionKind::BodyStyle,
            MapOption::StringKind(_) => OptionKind::StringKind,
            MapOption::DateKind(_) => OptionKind::DateKind,
        }
    }

    fn scope(&self) -> OptionScope {
        match self {
            MapOption::HeaderRow(_) => HeaderRow::SCOPE,
            MapOption::ReadingFailurePolicy(_) => ReadingFailurePolicy::SCOPE,
            MapOption::DefaultReadingResolution(_) => DefaultReadingResolution::SCOPE,
            MapOption::DefaultValue(_) => DefaultValue::SCOPE,
            MapOption::Optional(_) => Optional::SCOPE,
            MapOption::HeaderStyle(_) => HeaderStyle::SCOPE,
            MapOption::BodyStyle(_) => BodyStyle::SCOPE,
            MapOption::StringKind(_) => StringKind::SCOPE,
            MapOption::DateKind(_) => DateKind::SCOPE,
        }
    }

    fn allowed_types(&self) -> &'static [ValueKind] {
        match self {
            MapOption::StringKind(_) => StringKind::allowed_types(),
            MapOption::DateKind(_) => DateKind::allowed_types(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    entries: BTreeMap<OptionKind, MapOption>,
}

impl OptionStore {
    /// Validate and collect the options of a resource map.
    pub(crate) fn for_resource(map: &str, options: Vec<MapOption>) -> Result<Self> {
        let target = || OptionTarget::Resource(map.to_string());
        let mut store = OptionStore::default();
        for option in options {
            if !option.scope().admits_resource() {
                return Err(MapError::OptionScope {
                    target: target(),
                    kind: option.kind(),
                });
            }
            store.insert(option, target)?;
        }
        Ok(store)
    }

    /// Validate and collect the options of a property whose values are `value_kind`.
    pub(crate) fn for_property(
        property: &str,
        value_kind: ValueKind,
        options: Vec<MapOption>,
    ) -> Result<Self> {
        let target = || OptionTarget::Property(property.to_string());
        let mut store = OptionStore::default();
        for option in options {
            if !option.scope().admits_property() {
                return Err(MapError::OptionScope {
                    target: target(),
                    kind: option.kind(),
                });
            }
            let allowed = option.allowed_types();
            if !allowed.is_empty() && !allowed.contains(&value_kind) {
                return Err(MapError::OptionTypeNotAllowed {
                    property: property.to_string(),
                    kind: option.kind(),
                    allowed,
                    found: value_kind,
                });
            }
            if let MapOption::DefaultValue(DefaultValue(value)) = &option {
                if value.kind() != Some(value_kind) {
                    return Err(MapError::DefaultTypeMismatch {
                        property: property.to_string(),
                        expected: value_kind,
                        found: value
                            .kind()
                            .map_or_else(|| "an empty value".to_string(), |k| k.to_string()),
                    });
                }
            }
            store.insert(option, target)?;
        }
        Ok(store)
    }

    fn insert(&mut self, option: MapOption, target: impl Fn() -> OptionTarget) -> Result<()> {
        let kind = option.kind();
        if let MapOption::HeaderRow(HeaderRow(0)) = option {
            return Err(MapError::InvalidHeaderRow { target: target() });
        }
        if self.entries.contains_key(&kind) {
            return Err(MapError::DuplicateOption {
                target: target(),
                kind,
            });
        }
        self.entries.insert(kind, option);
        Ok(())
    }

    pub fn find<K: MapExtension>(&self) -> Option<&K> {
        self.entries.get(&K::KIND).and_then(K::from_option)
    }

    pub fn contains(&self, kind: OptionKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapOption> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
