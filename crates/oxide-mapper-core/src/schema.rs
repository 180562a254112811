//! Entity metadata.
//!
//! `#[derive(Entity)]` implements the [`Entity`] trait, which describes a
//! mapped struct (table, ordered properties, identifier) and gives
//! name-based read and write access to its fields. The metadata is resolved
//! once per type by a [`MetadataProvider`](crate::MetadataProvider) and
//! cached by the generator registry.

use crate::error::Result;
use crate::value::{SqlValue, ValueKind};

/// A mapped entity type.
///
/// # Example
///
/// ```ignore
/// use oxide_mapper_derive::Entity;
///
/// #[derive(Debug, Default, Entity)]
/// #[table(name = "t_role")]
/// struct Role {
///     #[column(primary_key)]
///     id: Option<i64>,
///     name: Option<String>,
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    /// Builds the mapping metadata for this type.
    fn metadata() -> EntityMetadata;

    /// Reads a property by name, `None` if the entity has no such property.
    fn read_property(&self, property: &str) -> Option<SqlValue>;

    /// Writes a property by name.
    ///
    /// # Errors
    ///
    /// Fails for unknown properties and for values that do not convert into
    /// the field type.
    fn write_property(&mut self, property: &str, value: SqlValue) -> Result<()>;
}

/// One persistent property of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentProperty {
    /// Rust field name.
    pub name: &'static str,
    /// Column name.
    pub column: &'static str,
    /// Kind of value the field holds.
    pub kind: ValueKind,
    /// Whether the property participates in inserts and updates.
    pub writable: bool,
    /// Whether the property is written on insert only.
    pub insert_only: bool,
    /// Whether the property is the identifier.
    pub id: bool,
}

impl PersistentProperty {
    /// Creates a writable, non-identifier property.
    #[must_use]
    pub const fn new(name: &'static str, column: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            column,
            kind,
            writable: true,
            insert_only: false,
            id: false,
        }
    }

    /// Marks the property as the identifier.
    #[must_use]
    pub const fn identifier(mut self) -> Self {
        self.id = true;
        self
    }

    /// Excludes the property from inserts and updates.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Excludes the property from updates.
    #[must_use]
    pub const fn insert_only(mut self) -> Self {
        self.insert_only = true;
        self
    }
}

/// Immutable mapping metadata of one entity type.
///
/// Property order is declaration order and drives column order in every
/// generated statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    type_name: &'static str,
    table: &'static str,
    properties: Vec<PersistentProperty>,
}

impl EntityMetadata {
    /// Creates metadata for a table.
    #[must_use]
    pub const fn new(
        type_name: &'static str,
        table: &'static str,
        properties: Vec<PersistentProperty>,
    ) -> Self {
        Self {
            type_name,
            table,
            properties,
        }
    }

    /// Rust type name of the entity.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// All persistent properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    /// Looks up a property by Rust field name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The identifier property, if the entity declares one.
    #[must_use]
    pub fn id_property(&self) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.id)
    }

    /// Returns true if an identifier property is declared.
    ///
    /// Entities without one are natural-key or composite-key tables whose
    /// key values the caller provides.
    #[must_use]
    pub fn has_id_property(&self) -> bool {
        self.id_property().is_some()
    }
}
