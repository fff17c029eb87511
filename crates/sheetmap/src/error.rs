use crate::options::OptionKind;
use sheetmap_common::ValueKind;
use sheetmap_workbook::IoError;
use thiserror::Error;

/// Where an option was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionTarget {
    Resource(String),
    Property(String),
}

impl std::fmt::Display for OptionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionTarget::Resource(name) => write!(f, "resource map `{name}`"),
            OptionTarget::Property(name) => write!(f, "property `{name}`"),
        }
    }
}

/// A single cell value could not be produced for writing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error("expected a {expected} value, found {found}")]
    KindMismatch { expected: ValueKind, found: String },

    #[error("value is empty but the property is not nullable")]
    UnexpectedEmpty,

    #[error("number {0} cannot be stored in a cell")]
    NonFinite(f64),

    #[error("{value} is outside the range of date serial numbers")]
    OutOfRange { value: String },

    #[error("text of {len} characters exceeds the {max} character cell limit")]
    TextTooLong { len: usize, max: usize },
}

/// Cell text could not be coerced to the property's declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot read `{text}` as {expected}: {reason}")]
pub struct DeserializationError {
    pub text: String,
    pub expected: ValueKind,
    pub reason: String,
}

/// A typed field could not be produced from a cell value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("value for `{0}` is missing")]
    Missing(String),

    #[error("expected {expected}, found {found}")]
    Kind { expected: ValueKind, found: String },

    #[error("{value} does not fit in {target}")]
    Range { value: String, target: &'static str },

    #[error("`{property}`: {reason}")]
    Property { property: String, reason: String },
}

impl ConversionError {
    /// Member the error was raised for, when known.
    pub fn property(&self) -> Option<&str> {
        match self {
            ConversionError::Missing(name) => Some(name),
            ConversionError::Property { property, .. } => Some(property),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    // Configuration
    #[error("property #{index} of `{map}` has an empty header name")]
    EmptyHeaderName { map: String, index: usize },

    #[error("header name `{name}` is declared twice in `{map}`")]
    DuplicateHeaderName { map: String, name: String },

    #[error("column {column} of `{map}` is claimed by both `{first}` and `{second}`")]
    DuplicateColumn {
        map: String,
        column: u32,
        first: String,
        second: String,
    },

    #[error("property `{property}` declares column {column}; columns must be within 1..={max}")]
    ColumnOutOfRange {
        property: String,
        column: u32,
        max: u32,
    },

    #[error("header row must be at least 1 on {target}")]
    InvalidHeaderRow { target: OptionTarget },

    #[error("option {kind:?} registered more than once on {target}")]
    DuplicateOption {
        target: OptionTarget,
        kind: OptionKind,
    },

    #[error("option {kind:?} cannot be registered on {target}")]
    OptionScope {
        target: OptionTarget,
        kind: OptionKind,
    },

    #[error("option {kind:?} on property `{property}` requires one of {allowed:?}, found {found}")]
    OptionTypeNotAllowed {
        property: String,
        kind: OptionKind,
        allowed: &'static [ValueKind],
        found: ValueKind,
    },

    #[error("default value for `{property}` must be {expected}, found {found}")]
    DefaultTypeMismatch {
        property: String,
        expected: ValueKind,
        found: String,
    },

    #[error("constructor parameter `{parameter}` of `{map}` names no declared property")]
    UnknownConstructorParameter { map: String, parameter: String },

    #[error("resource map `{map}` is registered twice")]
    DuplicateMap { map: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    // Lookup
    #[error("no resource map is registered for `{resource}`")]
    NotFound { resource: &'static str },

    #[error("`{resource}` has {} resource maps ({}); pick one explicitly", .candidates.len(), .candidates.join(", "))]
    AmbiguousMap {
        resource: &'static str,
        candidates: Vec<String>,
    },

    /// Typed form of [`MapError::NotFound`] for lookups by mapping or name.
    #[error("resource map `{map}` is not registered for `{resource}`")]
    MapTypeNotFound {
        resource: &'static str,
        map: String,
    },

    // String indexer
    #[error("text `{0}` was never indexed in this session")]
    StringNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Writing
    #[error("cannot serialize `{property}` on row {row}: {source}")]
    Serialization {
        property: String,
        row: u32,
        #[source]
        source: SerializationError,
    },

    #[error("style key `{key}` does not resolve to a style")]
    UnknownStyle { key: String },

    #[error("cannot position at row {row}, column {column}: cursor already at row {at_row}, column {at_column}")]
    CursorConflict {
        row: u32,
        column: u32,
        at_row: u32,
        at_column: u32,
    },

    // Backend
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MapError {
    /// Wrap a foreign backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        match err.downcast::<IoError>() {
            Ok(io) => MapError::Io(*io),
            Err(other) => MapError::Backend(other),
        }
    }

    /// No map matched a lookup, by resource type or by mapping.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MapError::NotFound { .. } | MapError::MapTypeNotFound { .. }
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MapError::EmptyHeaderName { .. }
                | MapError::DuplicateHeaderName { .. }
                | MapError::DuplicateColumn { .. }
                | MapError::ColumnOutOfRange { .. }
                | MapError::InvalidHeaderRow { .. }
                | MapError::DuplicateOption { .. }
                | MapError::OptionScope { .. }
                | MapError::OptionTypeNotAllowed { .. }
                | MapError::DefaultTypeMismatch { .. }
                | MapError::UnknownConstructorParameter { .. }
                | MapError::DuplicateMap { .. }
                | MapError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
