//! Property maps: one typed field of a resource bound to a column.

use crate::convert::CellType;
use crate::error::{ConversionError, Result};
use crate::key::ResourceMapKey;
use crate::options::{
    BodyStyle, DateKind, DefaultReadingResolution, DefaultValue, HeaderStyle, MapOption,
    Optional, OptionStore, ReadingResolution, StringKind,
};
use sheetmap_common::{CellValue, ValueKind};
use std::fmt;

type Getter<T> = Box<dyn Fn(&T) -> CellValue + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, CellValue) -> std::result::Result<(), ConversionError> + Send + Sync>;

/// Type-erased view of a built property, shared with serializers and results.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    key: ResourceMapKey,
    member: String,
    kind: ValueKind,
    nullable: bool,
    options: OptionStore,
}

impl PropertyDescriptor {
    pub fn key(&self) -> &ResourceMapKey {
        &self.key
    }

    /// Header text.
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Name of the underlying data member.
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn optional(&self) -> Option<Optional> {
        self.options.find::<Optional>().copied()
    }

    pub fn default_value(&self) -> Option<&CellValue> {
        self.options.find::<DefaultValue>().map(|d| &d.0)
    }

    /// Effective default-reading resolution given the resource-level fallback.
    pub fn resolution(&self, resource: &OptionStore) -> ReadingResolution {
        self.options
            .find::<DefaultReadingResolution>()
            .or_else(|| resource.find::<DefaultReadingResolution>())
            .map(|r| r.0)
            .unwrap_or_default()
    }
}

/// Declaration of one property of `T`.
///
/// Options are collected unchecked and validated when the owning
/// [`ResourceMap`](crate::ResourceMap) is built.
pub struct PropertyMap<T> {
    key: ResourceMapKey,
    member: String,
    kind: ValueKind,
    nullable: bool,
    options: Vec<MapOption>,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> PropertyMap<T> {
    /// Declare a property named `name` read through `get` and assigned through `set`.
    pub fn new<V, G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        T: 'static,
        V: CellType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            member: name.clone(),
            key: ResourceMapKey::new(name),
            kind: V::KIND,
            nullable: V::NULLABLE,
            options: Vec::new(),
            getter: Box::new(move |resource: &T| get(resource).into_cell()),
            setter: Box::new(move |resource: &mut T, value: CellValue| {
                set(resource, V::from_cell(value)?);
                Ok(())
            }),
        }
    }

    pub fn column(mut self, number: u32) -> Self {
        self.key = self.key.with_number(number);
        self
    }

    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.member = member.into();
        self
    }

    pub fn option(mut self, option: impl Into<MapOption>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn optional(self, optional: Optional) -> Self {
        self.option(optional)
    }

    pub fn default_value(self, value: impl Into<CellValue>) -> Self {
        self.option(DefaultValue(value.into()))
    }

    pub fn default_reading_resolution(self, resolution: ReadingResolution) -> Self {
        self.option(DefaultReadingResolution(resolution))
    }

    pub fn header_style(self, key: impl Into<String>) -> Self {
        self.option(HeaderStyle(key.into()))
    }

    pub fn body_style(self, key: impl Into<String>) -> Self {
        self.option(BodyStyle(key.into()))
    }

    pub fn string_kind(self, kind: StringKind) -> Self {
        self.option(kind)
    }

    pub fn date_kind(self, kind: DateKind) -> Self {
        self.option(kind)
    }

    pub fn key(&self) -> &ResourceMapKey {
        &self.key
    }

    pub(crate) fn bind(self) -> Result<BoundProperty<T>> {
        let options = OptionStore::for_property(self.key.name(), self.kind, self.options)?;
        Ok(BoundProperty {
            descriptor: PropertyDescriptor {
                key: self.key,
                member: self.member,
                kind: self.kind,
                nullable: self.nullable,
                options,
            },
            getter: self.getter,
            setter: self.setter,
        })
    }
}

impl<T> fmt::Debug for PropertyMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("key", &self.key)
            .field("member", &self.member)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A validated property with its accessors.
pub(crate) struct BoundProperty<T> {
    pub(crate) descriptor: PropertyDescriptor,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> fmt::Debug for BoundProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundProperty")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<T> BoundProperty<T> {
    pub(crate) fn get(&self, resource: &T) -> CellValue {
        (self.getter)(resource)
    }

    pub(crate) fn set(
        &self,
        resource: &mut T,
        value: CellValue,
    ) -> std::result::Result<(), ConversionError> {
        (self.setter)(resource, value)
    }
}
