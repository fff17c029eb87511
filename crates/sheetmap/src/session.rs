//! Session facade tying the registry, configuration, styles and serializer together.

use crate::config::MapperConfig;
use crate::error::Result;
use crate::layout::ColumnLayout;
use crate::map::ResourceMap;
use crate::reader::PageReader;
use crate::registry::{MapRegistry, ResourceMapping};
use crate::result::ReadingResult;
use crate::serialize::{CellSerializer, StandardSerializer};
use crate::strings::StringIndexer;
use crate::writer::PageWriter;
use sheetmap_workbook::{NoStyles, SheetReader, SheetWriter, StyleResolver};
use std::sync::Arc;

/// Reads and writes resources through the maps of a shared registry.
///
/// Every write starts a fresh string table, so one `Mapper` can serve any
/// number of output targets.
pub struct Mapper {
    registry: Arc<MapRegistry>,
    config: MapperConfig,
    styles: Box<dyn StyleResolver + Send + Sync>,
    serializer: Box<dyn CellSerializer>,
}

impl Mapper {
    pub fn new(registry: Arc<MapRegistry>) -> Self {
        Self::with_config(registry, MapperConfig::default())
    }

    pub fn with_config(registry: Arc<MapRegistry>, config: MapperConfig) -> Self {
        Self {
            serializer: Box::new(StandardSerializer::from_config(&config)),
            registry,
            config,
            styles: Box::new(NoStyles),
        }
    }

    pub fn styles(mut self, styles: impl StyleResolver + Send + Sync + 'static) -> Self {
        self.styles = Box::new(styles);
        self
    }

    pub fn serializer(mut self, serializer: impl CellSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    pub fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Write `resources` with the only map registered for `T`.
    pub fn write<T: 'static, W: SheetWriter>(
        &self,
        sink: &mut W,
        resources: &[T],
    ) -> Result<ColumnLayout> {
        let map = self.registry.single::<T>()?;
        self.write_map(&map, sink, resources)
    }

    /// Write `resources` with the map registered through `M`.
    pub fn write_with<M: ResourceMapping, W: SheetWriter>(
        &self,
        sink: &mut W,
        resources: &[M::Resource],
    ) -> Result<ColumnLayout> {
        let map = self.registry.single_of::<M>()?;
        self.write_map(&map, sink, resources)
    }

    /// Write with an explicit map, bypassing the registry.
    pub fn write_map<T, W: SheetWriter>(
        &self,
        map: &ResourceMap<T>,
        sink: &mut W,
        resources: &[T],
    ) -> Result<ColumnLayout> {
        let mut strings = StringIndexer::new();
        let layout = PageWriter::new(map, self.serializer.as_ref(), self.styles.as_ref(), &self.config)
            .write(sink, resources, &mut strings)?;
        strings.emit(sink)?;
        Ok(layout)
    }

    pub fn read<T: 'static, R: SheetReader>(&self, source: &mut R) -> Result<ReadingResult<T>> {
        let map = self.registry.single::<T>()?;
        self.read_map(&map, source)
    }

    pub fn read_with<M: ResourceMapping, R: SheetReader>(
        &self,
        source: &mut R,
    ) -> Result<ReadingResult<M::Resource>> {
        let map = self.registry.single_of::<M>()?;
        self.read_map(&map, source)
    }

    pub fn read_map<T, R: SheetReader>(
        &self,
        map: &ResourceMap<T>,
        source: &mut R,
    ) -> Result<ReadingResult<T>> {
        PageReader::new(map, self.serializer.as_ref(), &self.config).read(source)
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
