//! Lookup of resource maps by resource type.
//!
//! The registry is assembled once and is read-only afterwards, so it can be
//! shared across threads behind an `Arc`.

use crate::error::{MapError, Result};
use crate::map::ResourceMap;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

/// A named mapping declaration for one resource type.
///
/// Implement this on a marker type to register the map with
/// [`MapRegistryBuilder::register`] and look it up again with
/// [`MapRegistry::single_of`].
pub trait ResourceMapping: 'static {
    type Resource: 'static;

    fn map() -> Result<ResourceMap<Self::Resource>>;
}

struct Entry {
    name: String,
    mapping: Option<TypeId>,
    map: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    fn downcast<T: 'static>(&self) -> Option<Arc<ResourceMap<T>>> {
        Arc::clone(&self.map).downcast::<ResourceMap<T>>().ok()
    }
}

#[derive(Default)]
pub struct MapRegistry {
    by_resource: FxHashMap<TypeId, Vec<Entry>>,
}

impl MapRegistry {
    pub fn builder() -> MapRegistryBuilder {
        MapRegistryBuilder::default()
    }

    /// The only map registered for `T`.
    pub fn single<T: 'static>(&self) -> Result<Arc<ResourceMap<T>>> {
        let entries = self.entries::<T>();
        match entries {
            [] => Err(MapError::NotFound {
                resource: type_name::<T>(),
            }),
            [entry] => entry.downcast::<T>().ok_or(MapError::NotFound {
                resource: type_name::<T>(),
            }),
            many => Err(MapError::AmbiguousMap {
                resource: type_name::<T>(),
                candidates: many.iter().map(|e| e.name.clone()).collect(),
            }),
        }
    }

    /// The map registered through the mapping type `M`.
    ///
    /// Fails with [`MapError::MapTypeNotFound`], the not-found error for a
    /// named lookup, when `M` was never registered; see
    /// [`MapError::is_not_found`].
    pub fn single_of<M: ResourceMapping>(&self) -> Result<Arc<ResourceMap<M::Resource>>> {
        let mapping = TypeId::of::<M>();
        self.entries::<M::Resource>()
            .iter()
            .find(|e| e.mapping == Some(mapping))
            .and_then(Entry::downcast::<M::Resource>)
            .ok_or_else(|| MapError::MapTypeNotFound {
                resource: type_name::<M::Resource>(),
                map: type_name::<M>().to_string(),
            })
    }

    /// The map for `T` registered under `name`. A missing name fails with
    /// [`MapError::MapTypeNotFound`].
    pub fn single_named<T: 'static>(&self, name: &str) -> Result<Arc<ResourceMap<T>>> {
        self.entries::<T>()
            .iter()
            .find(|e| e.name == name)
            .and_then(Entry::downcast::<T>)
            .ok_or_else(|| MapError::MapTypeNotFound {
                resource: type_name::<T>(),
                map: name.to_string(),
            })
    }

    /// Names of every map registered for `T`, in registration order.
    pub fn maps_for<T: 'static>(&self) -> Vec<&str> {
        self.entries::<T>().iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_resource.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_resource.is_empty()
    }

    fn entries<T: 'static>(&self) -> &[Entry] {
        self.by_resource
            .get(&TypeId::of::<T>())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .by_resource
            .values()
            .flatten()
            .map(|e| e.name.as_str())
            .collect();
        f.debug_struct("MapRegistry").field("maps", &names).finish()
    }
}

#[derive(Default)]
pub struct MapRegistryBuilder {
    registry: MapRegistry,
}

impl MapRegistryBuilder {
    /// Build `M`'s map and register it under the mapping type.
    pub fn register<M: ResourceMapping>(self) -> Result<Self> {
        let map = M::map()?;
        self.push(map, Some(TypeId::of::<M>()))
    }

    /// Register an already built map; its identity is its name.
    pub fn insert<T: 'static>(self, map: ResourceMap<T>) -> Result<Self> {
        self.push(map, None)
    }

    fn push<T: 'static>(mut self, map: ResourceMap<T>, mapping: Option<TypeId>) -> Result<Self> {
        let entries = self
            .registry
            .by_resource
            .entry(TypeId::of::<T>())
            .or_default();
        if entries.iter().any(|e| e.name == map.name()) {
            return Err(MapError::DuplicateMap {
                map: map.name().to_string(),
            });
        }
        entries.push(Entry {
            name: map.name().to_string(),
            mapping,
            map: Arc::new(map),
        });
        Ok(self)
    }

    pub fn build(self) -> MapRegistry {
        self.registry
    }
}
