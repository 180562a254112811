//! # oxide-mapper-core
//!
//! Per-entity SQL statement generation for mapped structs.
//!
//! This crate provides:
//! - Entity metadata (table, ordered properties, identifier) and a
//!   [`MetadataProvider`] that resolves it per type
//! - A [`StatementGenerator`] per entity type that caches its column
//!   projections and insert prefix, then emits bound INSERT, UPDATE, DELETE
//!   and SELECT statements for arbitrary instances
//! - A thread-safe [`GeneratorRegistry`] building each generator once
//! - A [`PropertyAccessor`] indirection with an ordered customizer chain
//!   for cross-cutting value handling
//!
//! ## Generating statements
//!
//! ```rust
//! use oxide_mapper_core::{GeneratorRegistry, MappingContext, SqliteDialect};
//! use oxide_mapper_derive::Entity;
//!
//! #[derive(Debug, Default, Entity)]
//! #[table(name = "users")]
//! struct User {
//!     #[column(primary_key)]
//!     id: Option<i64>,
//!     name: Option<String>,
//!     email: Option<String>,
//! }
//!
//! let registry = GeneratorRegistry::builder(MappingContext::new().with::<User>())
//!     .dialect(SqliteDialect::new())
//!     .build();
//! let users = registry.generator::<User>().unwrap();
//!
//! let mut user = User {
//!     id: None,
//!     name: Some(String::from("alice")),
//!     email: None,
//! };
//! let insert = users.insert_selective(&mut user).unwrap();
//! assert_eq!(insert.sql, "INSERT INTO \"users\" (\"name\") VALUES (?1)");
//! ```
//!
//! ## Criteria
//!
//! Updates, deletes and selects accept [`Criteria`] written against
//! property names. Values are bound as named parameters:
//!
//! ```rust
//! # use oxide_mapper_core::{GeneratorRegistry, MappingContext};
//! # use oxide_mapper_derive::Entity;
//! # #[derive(Debug, Default, Entity)]
//! # #[table(name = "users")]
//! # struct User {
//! #     #[column(primary_key)]
//! #     id: Option<i64>,
//! #     name: Option<String>,
//! # }
//! use oxide_mapper_core::Criteria;
//!
//! let registry = GeneratorRegistry::new(MappingContext::new().with::<User>());
//! let users = registry.generator::<User>().unwrap();
//!
//! let delete = users.delete_all(Some(&Criteria::eq("name", "bob"))).unwrap();
//! assert_eq!(delete.sql, "DELETE FROM \"users\" WHERE \"users\".\"name\" = :name");
//! ```

pub mod accessor;
pub mod bound;
pub mod convert;
pub mod criteria;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod registry;
pub mod render;
pub mod row;
pub mod schema;
pub mod value;

pub use accessor::{
    CustomizerChain, Identity, InstanceAccessor, PropertyAccessor, PropertyAccessorCustomizer,
    ReadOnlyAccessor, Then,
};
pub use bound::{BatchInsertStatement, InsertStatement, NamedStatement, ParameterSource};
pub use convert::{ConvertingCustomizer, IntegerToBoolean, TextToTimestamp, ValueConverter};
pub use criteria::{Criteria, CriteriaExpr, QueryMapper};
pub use dialect::{
    Dialect, DialectKind, GenericDialect, IdentifierProcessing, PostgresDialect, SqliteDialect,
};
pub use error::{MapperError, Result};
pub use generator::{IdValueSource, StatementGenerator};
pub use mapping::{MappingContext, MetadataProvider};
pub use registry::{GeneratorRegistry, RegistryBuilder};
pub use row::RowSource;
pub use schema::{Entity, EntityMetadata, PersistentProperty};
pub use value::{FromSqlValue, SqlValue, ToSqlValue, ValueKind};
