//! Write-side page mapper: emits a header row and one body row per resource.

use crate::config::MapperConfig;
use crate::error::{MapError, Result};
use crate::layout::ColumnLayout;
use crate::map::ResourceMap;
use crate::options::{BodyStyle, HeaderStyle, StringKind};
use crate::serialize::CellSerializer;
use crate::strings::StringIndexer;
use sheetmap_workbook::{CellAddress, CellData, SheetWriter, StyleId, StyleResolver};

pub struct PageWriter<'a, T> {
    map: &'a ResourceMap<T>,
    serializer: &'a dyn CellSerializer,
    styles: &'a dyn StyleResolver,
    config: &'a MapperConfig,
}

impl<'a, T> PageWriter<'a, T> {
    pub fn new(
        map: &'a ResourceMap<T>,
        serializer: &'a dyn CellSerializer,
        styles: &'a dyn StyleResolver,
        config: &'a MapperConfig,
    ) -> Self {
        Self {
            map,
            serializer,
            styles,
            config,
        }
    }

    /// Write the header and every resource starting at the sink's cursor.
    ///
    /// The header goes to the map's header row, which must not lie behind the
    /// cursor. Without that option it goes to the cursor's row, or to the
    /// configured default when nothing has been written yet. Text is indexed
    /// into `strings` as it is written; emitting the table is left to the
    /// caller.
    pub fn write<'r, W, I>(
        &self,
        sink: &mut W,
        resources: I,
        strings: &mut StringIndexer,
    ) -> Result<ColumnLayout>
    where
        W: SheetWriter,
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        let layout = self.map.layout();
        let header_row = match self.map.header_row() {
            Some(row) => row,
            None if sink.position() == CellAddress::new(1, 1) => self.config.default_header_row,
            None => sink.row(),
        };

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("write_page", map = self.map.name(), header_row).entered();
        #[cfg(feature = "tracing")]
        {
            let columns: Vec<(u32, &str)> =
                layout.iter().map(|c| (c.column, c.name.as_str())).collect();
            tracing::debug!(?columns, "resolved column layout");
        }

        let (header_styles, body_styles) = self.resolve_styles()?;

        move_to_row(sink, header_row)?;
        for (column, style) in layout.iter().zip(&header_styles) {
            move_to_column(sink, column.column)?;
            let cell = match self.config.string_kind {
                StringKind::Shared => {
                    CellData::shared_text(column.name.as_str(), strings.add(&column.name))
                }
                StringKind::Inline => CellData::from_value(column.name.as_str()),
            };
            sink.write_cell(cell.with_style(*style))
                .map_err(MapError::backend)?;
        }
        next_row(sink)?;

        #[cfg(feature = "tracing")]
        let mut written = 0usize;
        for resource in resources {
            let row = sink.row();
            for (column, style) in layout.iter().zip(&body_styles) {
                move_to_column(sink, column.column)?;
                let property = self
                    .map
                    .property(column.property)
                    .ok_or_else(|| MapError::InvalidArgument(column.name.clone()))?;
                let value = self.map.value_of(column.property, resource);
                let cell = self
                    .serializer
                    .serialize(value, property, strings)
                    .map_err(|source| MapError::Serialization {
                        property: column.name.clone(),
                        row,
                        source,
                    })?;
                sink.write_cell(cell.with_style(*style))
                    .map_err(MapError::backend)?;
            }
            next_row(sink)?;
            #[cfg(feature = "tracing")]
            {
                written += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(resources = written, "page written");
        Ok(layout.clone())
    }

    /// Per-column header and body styles, in layout order.
    fn resolve_styles(&self) -> Result<(Vec<Option<StyleId>>, Vec<Option<StyleId>>)> {
        let resource = self.map.options();
        let mut header = Vec::with_capacity(self.map.layout().len());
        let mut body = Vec::with_capacity(self.map.layout().len());
        for column in self.map.layout() {
            let options = self
                .map
                .property(column.property)
                .map(|p| p.options());
            let header_key = options
                .and_then(|o| o.find::<HeaderStyle>())
                .or_else(|| resource.find::<HeaderStyle>())
                .map(|s| s.0.as_str());
            let body_key = options
                .and_then(|o| o.find::<BodyStyle>())
                .or_else(|| resource.find::<BodyStyle>())
                .map(|s| s.0.as_str());
            header.push(self.resolve(header_key)?);
            body.push(self.resolve(body_key)?);
        }
        Ok((header, body))
    }

    fn resolve(&self, key: Option<&str>) -> Result<Option<StyleId>> {
        let Some(key) = key else {
            return Ok(None);
        };
        self.styles
            .resolve(key)
            .map(Some)
            .ok_or_else(|| MapError::UnknownStyle {
                key: key.to_string(),
            })
    }
}

fn move_to_row<W: SheetWriter>(sink: &mut W, row: u32) -> Result<()> {
    if row < sink.row() {
        return Err(MapError::CursorConflict {
            row,
            column: 1,
            at_row: sink.row(),
            at_column: sink.column(),
        });
    }
    sink.advance_to_row(row).map_err(MapError::backend)
}

fn move_to_column<W: SheetWriter>(sink: &mut W, column: u32) -> Result<()> {
    if column < sink.column() {
        return Err(MapError::CursorConflict {
            row: sink.row(),
            column,
            at_row: sink.row(),
            at_column: sink.column(),
        });
    }
    sink.advance_to_column(column).map_err(MapError::backend)
}

fn next_row<W: SheetWriter>(sink: &mut W) -> Result<()> {
    let row = sink.row().saturating_add(1);
    sink.advance_to_row(row).map_err(MapError::backend)
}
