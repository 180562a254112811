//! Metadata resolution.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{MapperError, Result};
use crate::schema::{Entity, EntityMetadata};

/// Resolves the mapping metadata of an entity type.
pub trait MetadataProvider: Send + Sync {
    /// Returns the metadata for the type identified by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::UnmappedEntity`] when the type is not mapped.
    fn persistent_entity(
        &self,
        entity: TypeId,
        type_name: &'static str,
    ) -> Result<Arc<EntityMetadata>>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Arc<P> {
    fn persistent_entity(
        &self,
        entity: TypeId,
        type_name: &'static str,
    ) -> Result<Arc<EntityMetadata>> {
        (**self).persistent_entity(entity, type_name)
    }
}

/// The set of entity types managed by the application.
///
/// Populated once at startup; lookups of types that were never registered
/// fail with [`MapperError::UnmappedEntity`].
///
/// ```ignore
/// let context = MappingContext::new().with::<User>().with::<Role>();
/// ```
#[derive(Debug, Default, Clone)]
pub struct MappingContext {
    entities: HashMap<TypeId, Arc<EntityMetadata>>,
}

impl MappingContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type.
    pub fn register<T: Entity>(&mut self) {
        self.entities
            .insert(TypeId::of::<T>(), Arc::new(T::metadata()));
    }

    /// Registers an entity type, builder style.
    #[must_use]
    pub fn with<T: Entity>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Returns true if the type was registered.
    #[must_use]
    pub fn contains<T: Entity>(&self) -> bool {
        self.entities.contains_key(&TypeId::of::<T>())
    }

    /// Returns the metadata of a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::UnmappedEntity`] when `T` was not registered.
    pub fn required_entity<T: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        self.persistent_entity(TypeId::of::<T>(), type_name::<T>())
    }
}

impl MetadataProvider for MappingContext {
    fn persistent_entity(
        &self,
        entity: TypeId,
        type_name: &'static str,
    ) -> Result<Arc<EntityMetadata>> {
        self.entities
            .get(&entity)
            .cloned()
            .ok_or(MapperError::UnmappedEntity { entity: type_name })
    }
}
