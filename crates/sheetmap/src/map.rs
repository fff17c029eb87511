//! Resource maps and their builders.

use crate::convert::FieldValues;
use crate::error::{ConversionError, MapError, Result};
use crate::layout::ColumnLayout;
use crate::options::{
    BodyStyle, DefaultReadingResolution, HeaderRow, HeaderStyle, MapOption, OptionStore,
    ReadingFailurePolicy, ReadingResolution,
};
use crate::property::{BoundProperty, PropertyDescriptor, PropertyMap};
use rustc_hash::FxHashSet;
use sheetmap_common::CellValue;
use std::fmt;

/// Explicit constructor receiving the values of its declared parameters.
pub type Constructor<T> =
    Box<dyn Fn(&mut FieldValues) -> std::result::Result<T, ConversionError> + Send + Sync>;

/// How a resource instance is created before setters run.
pub enum Construction<T> {
    /// Start from a default instance and assign every property through its setter.
    Default(fn() -> T),
    /// Build through `constructor` from the named properties; the rest are set afterwards.
    Explicit {
        parameters: Vec<String>,
        constructor: Constructor<T>,
    },
}

impl<T> fmt::Debug for Construction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construction::Default(_) => f.write_str("Default"),
            Construction::Explicit { parameters, .. } => f
                .debug_struct("Explicit")
                .field("parameters", parameters)
                .finish_non_exhaustive(),
        }
    }
}

/// A property value that could not be bound while constructing a resource.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BindFailure {
    pub property: usize,
    pub error: ConversionError,
}

/// Validated declaration of how `T` maps to a page.
pub struct ResourceMap<T> {
    name: String,
    properties: Vec<BoundProperty<T>>,
    options: OptionStore,
    construction: Construction<T>,
    /// Declaration indices of constructor parameters, in parameter order.
    parameters: Vec<usize>,
    layout: ColumnLayout,
}

impl<T: Default> ResourceMap<T> {
    /// Start a map whose resources are created with `T::default()`.
    pub fn builder(name: impl Into<String>) -> ResourceMapBuilder<T> {
        ResourceMapBuilder::new(name.into(), Construction::Default(T::default))
    }
}

impl<T> ResourceMap<T> {
    /// Start a map whose resources are created by `constructor`.
    ///
    /// `parameters` name the members handed to the constructor through
    /// [`FieldValues`]; every other property is assigned through its setter.
    pub fn builder_with<I, S, F>(
        name: impl Into<String>,
        parameters: I,
        constructor: F,
    ) -> ResourceMapBuilder<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&mut FieldValues) -> std::result::Result<T, ConversionError> + Send + Sync + 'static,
    {
        ResourceMapBuilder::new(
            name.into(),
            Construction::Explicit {
                parameters: parameters.into_iter().map(Into::into).collect(),
                constructor: Box::new(constructor),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &PropertyDescriptor> {
        self.properties.iter().map(|p| &p.descriptor)
    }

    pub fn property(&self, index: usize) -> Option<&PropertyDescriptor> {
        self.properties.get(index).map(|p| &p.descriptor)
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn construction(&self) -> &Construction<T> {
        &self.construction
    }

    pub fn header_row(&self) -> Option<u32> {
        self.options.find::<HeaderRow>().map(|h| h.0)
    }

    pub fn failure_policy(&self) -> Option<ReadingFailurePolicy> {
        self.options.find::<ReadingFailurePolicy>().copied()
    }

    pub(crate) fn value_of(&self, property: usize, resource: &T) -> CellValue {
        self.properties[property].get(resource)
    }

    /// Create a resource from per-property values indexed by declaration order.
    ///
    /// `None` entries are left untouched by setters and omitted from the
    /// constructor's [`FieldValues`].
    pub(crate) fn construct(
        &self,
        mut values: Vec<Option<CellValue>>,
    ) -> std::result::Result<T, BindFailure> {
        let mut resource = match &self.construction {
            Construction::Default(make) => make(),
            Construction::Explicit { constructor, .. } => {
                let mut fields = FieldValues::new();
                for &idx in &self.parameters {
                    if let Some(value) = values[idx].take() {
                        fields.insert(self.properties[idx].descriptor.member(), value);
                    }
                }
                constructor(&mut fields).map_err(|error| BindFailure {
                    property: self.blame(&error),
                    error,
                })?
            }
        };

        for (idx, value) in values.into_iter().enumerate() {
            if self.parameters.contains(&idx) {
                continue;
            }
            if let Some(value) = value {
                self.properties[idx]
                    .set(&mut resource, value)
                    .map_err(|error| BindFailure {
                        property: idx,
                        error,
                    })?;
            }
        }
        Ok(resource)
    }

    fn blame(&self, error: &ConversionError) -> usize {
        error
            .property()
            .and_then(|member| {
                self.properties
                    .iter()
                    .position(|p| p.descriptor.member() == member)
            })
            .or_else(|| self.parameters.first().copied())
            .unwrap_or(0)
    }
}

impl<T> fmt::Debug for ResourceMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMap")
            .field("name", &self.name)
            .field("properties", &self.properties().collect::<Vec<_>>())
            .field("options", &self.options)
            .field("construction", &self.construction)
            .field("layout", &self.layout)
            .finish()
    }
}

pub struct ResourceMapBuilder<T> {
    name: String,
    properties: Vec<PropertyMap<T>>,
    options: Vec<MapOption>,
    construction: Construction<T>,
}

impl<T> ResourceMapBuilder<T> {
    fn new(name: String, construction: Construction<T>) -> Self {
        Self {
            name,
            properties: Vec::new(),
            options: Vec::new(),
            construction,
        }
    }

    pub fn property(mut self, property: PropertyMap<T>) -> Self {
        self.properties.push(property);
        self
    }

    pub fn option(mut self, option: impl Into<MapOption>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn header_row(self, row: u32) -> Self {
        self.option(HeaderRow(row))
    }

    pub fn failure_policy(self, policy: ReadingFailurePolicy) -> Self {
        self.option(policy)
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

    /// Validate the declaration and resolve its column layout.
    pub fn build(self) -> Result<ResourceMap<T>> {
        let mut seen = FxHashSet::default();
        for (index, property) in self.properties.iter().enumerate() {
            let name = property.key().name();
            if name.trim().is_empty() {
                return Err(MapError::EmptyHeaderName {
                    map: self.name.clone(),
                    index,
                });
            }
            if !seen.insert(name) {
                return Err(MapError::DuplicateHeaderName {
                    map: self.name.clone(),
                    name: name.to_string(),
                });
            }
        }

        let layout = ColumnLayout::resolve(&self.name, self.properties.iter().map(|p| p.key()))?;
        let options = OptionStore::for_resource(&self.name, self.options)?;
        let properties = self
            .properties
            .into_iter()
            .map(PropertyMap::bind)
            .collect::<Result<Vec<_>>>()?;

        let mut parameters = Vec::new();
        if let Construction::Explicit {
            parameters: names, ..
        } = &self.construction
        {
            for name in names {
                let idx = properties
                    .iter()
                    .position(|p| p.descriptor.member() == name)
                    .ok_or_else(|| MapError::UnknownConstructorParameter {
                        map: self.name.clone(),
                        parameter: name.clone(),
                    })?;
                parameters.push(idx);
            }
        }

        Ok(ResourceMap {
            name: self.name,
            properties,
            options,
            construction: self.construction,
            parameters,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Optional;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        nick: Option<String>,
    }

    fn people() -> ResourceMapBuilder<Person> {
        ResourceMap::builder("people")
            .property(PropertyMap::new("Id", |p: &Person| p.id, |p, v| p.id = v).column(1))
            .property(PropertyMap::new(
                "Name",
                |p: &Person| p.name.clone(),
                |p, v| p.name = v,
            ))
    }

    #[test]
    fn build_resolves_layout() {
        let map = people().header_row(2).build().unwrap();
        assert_eq!(map.name(), "people");
        assert_eq!(map.header_row(), Some(2));
        assert_eq!(map.layout().column_of(1), Some(2));
        assert_eq!(map.properties().len(), 2);
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let err = people()
            .property(PropertyMap::new("Id", |p: &Person| p.id, |p, v| p.id = v))
            .build()
            .unwrap_err();
        assert!(matches!(err, MapError::DuplicateHeaderName { ref name, .. } if name == "Id"));

        let err = people()
            .property(PropertyMap::new(" ", |p: &Person| p.id, |p, v| p.id = v))
            .build()
            .unwrap_err();
        assert!(matches!(err, MapError::EmptyHeaderName { index: 2, .. }));
    }

    #[test]
    fn column_collision_fails_at_build() {
        let err = people()
            .property(
                PropertyMap::new("Code", |p: &Person| p.id, |p, v| p.id = v).column(1),
            )
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, MapError::DuplicateColumn { column: 1, .. }));
    }

    #[test]
    fn resource_scope_is_checked() {
        let err = people().option(Optional::Both).build().unwrap_err();
        assert!(matches!(err, MapError::OptionScope { .. }));
    }

    #[test]
    fn default_construction_uses_setters() {
        let map = people().build().unwrap();
        let person = map
            .construct(vec![Some(CellValue::Int(3)), Some(CellValue::from("Ada"))])
            .unwrap();
        assert_eq!(person.id, 3);
        assert_eq!(person.name, "Ada");

        let failure = map
            .construct(vec![Some(CellValue::from("x")), None])
            .unwrap_err();
        assert_eq!(failure.property, 0);
    }

    #[test]
    fn explicit_construction_binds_parameters() {
        let map = ResourceMap::builder_with("people", ["id"], |fields| {
            Ok(Person {
                id: fields.take("id")?,
                name: "from ctor".into(),
                nick: None,
            })
        })
        .property(PropertyMap::new("Id", |p: &Person| p.id, |_, _: i64| {}).member("id"))
        .property(PropertyMap::new(
            "Nick",
            |p: &Person| p.nick.clone(),
            |p, v| p.nick = v,
        ))
        .build()
        .unwrap();

        let person = map
            .construct(vec![Some(CellValue::Int(5)), Some(CellValue::from("Al"))])
            .unwrap();
        assert_eq!(person.id, 5);
        assert_eq!(person.name, "from ctor");
        assert_eq!(person.nick.as_deref(), Some("Al"));

        let failure = map.construct(vec![None, None]).unwrap_err();
        assert_eq!(failure.property, 0);
        assert_eq!(failure.error, ConversionError::Missing("id".into()));
    }

    #[test]
    fn unknown_constructor_parameter_is_rejected() {
        let err = ResourceMap::builder_with("people", ["age"], |_| Ok(Person::default()))
            .property(PropertyMap::new("Id", |p: &Person| p.id, |p, v| p.id = v))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, MapError::UnknownConstructorParameter { ref parameter, .. } if parameter == "age")
        );
    }
}
