//! Read-side reconciliation: checks the header row against the map, then
//! turns each data row into a resource or a structured row failure.

use crate::config::MapperConfig;
use crate::error::{MapError, Result};
use crate::map::ResourceMap;
use crate::options::{ReadingFailurePolicy, ReadingResolution};
use crate::property::PropertyDescriptor;
use crate::result::{
    HeaderReadingFailure, InvalidHeader, InvalidProperty, MissingHeader, MissingProperty,
    NumberedResource, ReadingResult, ResourceReadingFailure, ResourceReadingResult,
};
use crate::serialize::CellSerializer;
use sheetmap_common::{CellValue, ValueKind};
use sheetmap_workbook::{RowCells, SheetReader};

/// Where a property's value comes from once the header has been checked.
#[derive(Debug, Clone)]
enum Source {
    Cell,
    /// Header missing or mismatched but tolerated; the property is never set.
    Absent,
    /// Header missing or mismatched; the default applies to every row.
    Default(CellValue),
}

struct ColumnPlan<'m> {
    property: usize,
    column: u32,
    descriptor: &'m PropertyDescriptor,
    resolution: ReadingResolution,
    source: Source,
}

pub struct PageReader<'a, T> {
    map: &'a ResourceMap<T>,
    serializer: &'a dyn CellSerializer,
    config: &'a MapperConfig,
}

impl<'a, T> PageReader<'a, T> {
    pub fn new(
        map: &'a ResourceMap<T>,
        serializer: &'a dyn CellSerializer,
        config: &'a MapperConfig,
    ) -> Self {
        Self {
            map,
            serializer,
            config,
        }
    }

    /// Read every data row after the header.
    ///
    /// Only backend failures are errors; header and row problems are
    /// reported in the returned [`ReadingResult`].
    pub fn read<R: SheetReader>(&self, source: &mut R) -> Result<ReadingResult<T>> {
        let header_row = self
            .map
            .header_row()
            .unwrap_or(self.config.default_header_row);

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("read_page", map = self.map.name(), header_row).entered();

        let Some(header) = source.read_row(header_row).map_err(MapError::backend)? else {
            #[cfg(feature = "tracing")]
            tracing::warn!(header_row, "header row is missing");
            return Ok(ReadingResult::from_header_failure(
                HeaderReadingFailure::missing_row(),
            ));
        };

        let plans = match self.check_header(&header) {
            Ok(plans) => plans,
            Err(failure) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    missing = failure.missing_headers().len(),
                    invalid = failure.invalid_headers().len(),
                    "header does not match the map"
                );
                return Ok(ReadingResult::from_header_failure(failure));
            }
        };

        let policy = self
            .map
            .failure_policy()
            .unwrap_or(self.config.failure_policy);
        let mut result = ReadingResult::default();
        while let Some((row, cells)) = source.next_row().map_err(MapError::backend)? {
            let outcome = self.read_row(row, &cells, &plans);
            let failed = outcome.is_failure();
            #[cfg(feature = "tracing")]
            if let ResourceReadingResult::Failure(failure) = &outcome {
                tracing::debug!(%failure, "row failed");
            }
            result.push(outcome);
            if failed && policy == ReadingFailurePolicy::ExitOnFirstFailure {
                #[cfg(feature = "tracing")]
                tracing::debug!(row, "stopping after first failed row");
                break;
            }
        }
        Ok(result)
    }

    fn check_header(
        &self,
        header: &RowCells,
    ) -> std::result::Result<Vec<ColumnPlan<'a>>, HeaderReadingFailure> {
        let mut plans = Vec::with_capacity(self.map.layout().len());
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        for resolved in self.map.layout() {
            let Some(descriptor) = self.map.property(resolved.property) else {
                continue;
            };
            let resolution = descriptor.resolution(self.map.options());
            let found = header.get(&resolved.column);
            let source = match found {
                Some(text) if *text == resolved.name => Source::Cell,
                _ => {
                    let flag = if found.is_some() {
                        ReadingResolution::INVALID_HEADER
                    } else {
                        ReadingResolution::MISSING_HEADER
                    };
                    if descriptor.optional().is_some_and(|o| o.covers_header()) {
                        Source::Absent
                    } else if let Some(default) = descriptor
                        .default_value()
                        .filter(|_| resolution.contains(flag))
                    {
                        Source::Default(default.clone())
                    } else {
                        match found {
                            Some(text) => invalid.push(InvalidHeader {
                                name: resolved.name.clone(),
                                column: resolved.column,
                                found: text.clone(),
                            }),
                            None => missing.push(MissingHeader {
                                name: resolved.name.clone(),
                                column: resolved.column,
                            }),
                        }
                        continue;
                    }
                }
            };
            plans.push(ColumnPlan {
                property: resolved.property,
                column: resolved.column,
                descriptor,
                resolution,
                source,
            });
        }

        match HeaderReadingFailure::mismatched(missing, invalid) {
            Some(failure) => Err(failure),
            None => Ok(plans),
        }
    }

    fn read_row(&self, row: u32, cells: &RowCells, plans: &[ColumnPlan<'_>]) -> ResourceReadingResult<T> {
        let mut values: Vec<Option<CellValue>> = vec![None; self.map.properties().len()];
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        for plan in plans {
            let value = match &plan.source {
                Source::Absent => None,
                Source::Default(value) => Some(value.clone()),
                Source::Cell => match self.cell_text(cells, plan.column, plan.descriptor.kind()) {
                    None => {
                        if plan.descriptor.optional().is_some_and(|o| o.covers_body()) {
                            None
                        } else if let Some(default) = self.default_for(plan, ReadingResolution::MISSING_VALUE) {
                            Some(default)
                        } else {
                            missing.push(MissingProperty {
                                name: plan.descriptor.name().to_string(),
                                column: plan.column,
                            });
                            None
                        }
                    }
                    Some(text) => match self.serializer.deserialize(text, plan.descriptor) {
                        Ok(value) => Some(value),
                        Err(err) => match self.default_for(plan, ReadingResolution::INVALID_VALUE) {
                            Some(default) => Some(default),
                            None => {
                                invalid.push(InvalidProperty {
                                    name: plan.descriptor.name().to_string(),
                                    column: plan.column,
                                    text: text.to_string(),
                                    reason: err.reason,
                                });
                                None
                            }
                        },
                    },
                },
            };
            values[plan.property] = value;
        }

        if !missing.is_empty() || !invalid.is_empty() {
            return ResourceReadingResult::Failure(ResourceReadingFailure {
                row,
                missing,
                invalid,
            });
        }

        match self.map.construct(values) {
            Ok(resource) => ResourceReadingResult::Resource(NumberedResource { row, resource }),
            Err(bind) => {
                let column = plans
                    .iter()
                    .find(|p| p.property == bind.property)
                    .map(|p| p.column)
                    .or_else(|| self.map.layout().column_of(bind.property))
                    .unwrap_or_default();
                let name = self
                    .map
                    .property(bind.property)
                    .map(|p| p.name().to_string())
                    .unwrap_or_default();
                let text = cells.get(&column).cloned().unwrap_or_default();
                ResourceReadingResult::Failure(ResourceReadingFailure {
                    row,
                    missing: Vec::new(),
                    invalid: vec![InvalidProperty {
                        name,
                        column,
                        text,
                        reason: bind.error.to_string(),
                    }],
                })
            }
        }
    }

    /// Cell text for a property of `kind`; empty text is a value only for text.
    fn cell_text<'c>(&self, cells: &'c RowCells, column: u32, kind: ValueKind) -> Option<&'c str> {
        let text = cells.get(&column)?.as_str();
        let text = if self.config.trim_cells { text.trim() } else { text };
        (kind == ValueKind::Text || !text.is_empty()).then_some(text)
    }

    fn default_for(&self, plan: &ColumnPlan<'_>, condition: ReadingResolution) -> Option<CellValue> {
        if !plan.resolution.contains(condition) {
            return None;
        }
        plan.descriptor.default_value().cloned()
    }
}
