//! Results of reading a page back into resources.
//!
//! Header and row problems are data, not errors: a read always returns a
//! [`ReadingResult`] describing every resource it produced and every
//! discrepancy it found.

use std::fmt;

/// A resource read from the sheet together with its source row.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedResource<T> {
    pub row: u32,
    pub resource: T,
}

/// Outcome of reading one data row.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceReadingResult<T> {
    Resource(NumberedResource<T>),
    Failure(ResourceReadingFailure),
}

impl<T> ResourceReadingResult<T> {
    pub fn row(&self) -> u32 {
        match self {
            ResourceReadingResult::Resource(numbered) => numbered.row,
            ResourceReadingResult::Failure(failure) => failure.row,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResourceReadingResult::Failure(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingResultKind {
    Success,
    PartialFailure,
    Failure,
}

/// A declared header with no cell at its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingHeader {
    pub name: String,
    pub column: u32,
}

/// A header cell whose text differs from the declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHeader {
    pub name: String,
    pub column: u32,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderReadingFailure {
    missing_header_row: bool,
    missing: Vec<MissingHeader>,
    invalid: Vec<InvalidHeader>,
}

impl HeaderReadingFailure {
    /// The header row holds no cells at all.
    pub fn missing_row() -> Self {
        Self {
            missing_header_row: true,
            missing: Vec::new(),
            invalid: Vec::new(),
        }
    }

    /// Header mismatches, or `None` when there are none.
    pub fn mismatched(missing: Vec<MissingHeader>, invalid: Vec<InvalidHeader>) -> Option<Self> {
        if missing.is_empty() && invalid.is_empty() {
            return None;
        }
        Some(Self {
            missing_header_row: false,
            missing,
            invalid,
        })
    }

    pub fn missing_header_row(&self) -> bool {
        self.missing_header_row
    }

    pub fn missing_headers(&self) -> &[MissingHeader] {
        &self.missing
    }

    pub fn invalid_headers(&self) -> &[InvalidHeader] {
        &self.invalid
    }
}

impl fmt::Display for HeaderReadingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing_header_row {
            return f.write_str("header row is missing");
        }
        write!(
            f,
            "{} missing and {} mismatched header(s)",
            self.missing.len(),
            self.invalid.len()
        )
    }
}

/// A required cell that was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingProperty {
    pub name: String,
    pub column: u32,
}

/// A cell that could not be turned into the property's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProperty {
    pub name: String,
    pub column: u32,
    /// Raw cell text, empty when the value came from elsewhere.
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReadingFailure {
    pub row: u32,
    pub missing: Vec<MissingProperty>,
    pub invalid: Vec<InvalidProperty>,
}

impl fmt::Display for ResourceReadingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} missing and {} invalid value(s)",
            self.row,
            self.missing.len(),
            self.invalid.len()
        )
    }
}

/// Everything one read produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingResult<T> {
    resources: Vec<NumberedResource<T>>,
    failures: Vec<ResourceReadingFailure>,
    header_failure: Option<HeaderReadingFailure>,
}

impl<T> Default for ReadingResult<T> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            failures: Vec::new(),
            header_failure: None,
        }
    }
}

impl<T> ReadingResult<T> {
    pub fn from_header_failure(failure: HeaderReadingFailure) -> Self {
        Self {
            header_failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn push(&mut self, row: ResourceReadingResult<T>) {
        match row {
            ResourceReadingResult::Resource(numbered) => self.resources.push(numbered),
            ResourceReadingResult::Failure(failure) => self.failures.push(failure),
        }
    }

    pub fn kind(&self) -> ReadingResultKind {
        if self.header_failure.is_some() {
            return ReadingResultKind::Failure;
        }
        match (self.failures.is_empty(), self.resources.is_empty()) {
            (true, _) => ReadingResultKind::Success,
            (false, true) => ReadingResultKind::Failure,
            (false, false) => ReadingResultKind::PartialFailure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == ReadingResultKind::Success
    }

    pub fn resources(&self) -> &[NumberedResource<T>] {
        &self.resources
    }

    pub fn resource_failures(&self) -> &[ResourceReadingFailure] {
        &self.failures
    }

    pub fn header_failure(&self) -> Option<&HeaderReadingFailure> {
        self.header_failure.as_ref()
    }

    /// Drop row numbers and failures, keeping the resources in row order.
    pub fn into_values(self) -> Vec<T> {
        self.resources.into_iter().map(|n| n.resource).collect()
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<NumberedResource<T>>,
        Vec<ResourceReadingFailure>,
        Option<HeaderReadingFailure>,
    ) {
        (self.resources, self.failures, self.header_failure)
    }
}
