//! Declarative mapping between typed resources and spreadsheet pages.
//!
//! A [`ResourceMap`] declares how each property of a resource type lines up
//! with a column: its header text, an optional fixed column, and options such
//! as styles, optionality or default values. Maps are validated when built and
//! collected in a [`MapRegistry`]. A [`Mapper`] then writes resources through a
//! [`PageWriter`] and reads them back through a [`PageReader`], which reports
//! every header and row discrepancy in a [`ReadingResult`] instead of failing.
//!
//! ```no_run
//! use sheetmap::{MapRegistry, Mapper, PropertyMap, ResourceMap};
//! use sheetmap_workbook::MemorySheet;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! # fn main() -> sheetmap::Result<()> {
//! let map = ResourceMap::builder("people")
//!     .property(PropertyMap::new("Id", |p: &Person| p.id, |p, v| p.id = v))
//!     .property(PropertyMap::new("Name", |p: &Person| p.name.clone(), |p, v| p.name = v))
//!     .build()?;
//! let registry = Arc::new(MapRegistry::builder().insert(map)?.build());
//! let mapper = Mapper::new(registry);
//!
//! let mut sheet = MemorySheet::new();
//! mapper.write(&mut sheet, &[Person { id: 1, name: "Ada".into() }])?;
//! let people = mapper.read::<Person, _>(&mut sheet)?.into_values();
//! # Ok(())
//! # }
//! ```

mod config;
mod convert;
mod error;
mod key;
mod layout;
mod map;
mod options;
mod property;
mod reader;
mod registry;
mod result;
mod serialize;
mod session;
mod strings;
mod writer;

pub use config::MapperConfig;
pub use convert::{CellType, FieldValues};
pub use error::{
    ConversionError, DeserializationError, MapError, OptionTarget, Result, SerializationError,
};
pub use key::ResourceMapKey;
pub use layout::{ColumnLayout, ResolvedColumn};
pub use map::{Construction, Constructor, ResourceMap, ResourceMapBuilder};
pub use options::{
    BodyStyle, DateKind, DefaultReadingResolution, DefaultValue, HeaderRow, HeaderStyle,
    MapExtension, MapOption, OptionKind, OptionScope, OptionStore, Optional,
    ReadingFailurePolicy, ReadingResolution, StringKind,
};
pub use property::{PropertyDescriptor, PropertyMap};
pub use reader::PageReader;
pub use registry::{MapRegistry, MapRegistryBuilder, ResourceMapping};
pub use result::{
    HeaderReadingFailure, InvalidHeader, InvalidProperty, MissingHeader, MissingProperty,
    NumberedResource, ReadingResult, ReadingResultKind, ResourceReadingFailure,
    ResourceReadingResult,
};
pub use serialize::{CellSerializer, MAX_TEXT_LEN, StandardSerializer};
pub use session::Mapper;
pub use strings::StringIndexer;
pub use writer::PageWriter;
