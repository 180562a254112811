//! # oxide-mapper-sqlite
//!
//! SQLite execution for `oxide-mapper-core` statements over `sqlx`.
//!
//! # How SQLite differs from other dialects
//!
//! - **Numbered parameters**: SQLite accepts `?NNN` markers, so batch
//!   inserts can bind their column-major arguments directly. Named markers
//!   produced for updates, deletes and selects are rewritten to numbered
//!   ones before execution.
//! - **[Type affinity]**: SQLite stores every value in one of five storage
//!   classes regardless of the declared column type. Booleans come back as
//!   integers and timestamps as text; [`sqlite_registry`] installs the
//!   converters that turn them back into `bool` and `NaiveDateTime` fields.
//! - **Rowids**: a generated identifier is the `last_insert_rowid()` of the
//!   insert, and one multi-row insert receives consecutive rowids.
//! - **No arrays**: array values are rejected before they reach the driver.
//!
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_mapper_core::{Criteria, MappingContext};
//! use oxide_mapper_derive::Entity;
//! use oxide_mapper_sqlite::sqlite_registry;
//!
//! #[derive(Debug, Default, Entity)]
//! #[table(name = "users")]
//! struct User {
//!     #[column(primary_key)]
//!     id: Option<i64>,
//!     name: Option<String>,
//!     active: Option<bool>,
//! }
//!
//! let registry = sqlite_registry(MappingContext::new().with::<User>());
//! let users = registry.generator::<User>().unwrap();
//!
//! let update = users
//!     .update(
//!         &User { active: Some(false), ..User::default() },
//!         &Criteria::eq("name", "alice"),
//!     )
//!     .unwrap();
//! let (sql, args) = update.to_positional(registry.dialect()).unwrap();
//! assert_eq!(
//!     sql,
//!     "UPDATE \"users\" SET \"active\" = ?1 WHERE \"users\".\"name\" = ?2"
//! );
//! assert_eq!(args.len(), 2);
//! ```

mod error;
mod executor;
mod row;

pub use error::{ExecutorError, Result};
pub use executor::SqliteExecutor;
pub use row::SqliteRowSource;

use oxide_mapper_core::{ConvertingCustomizer, GeneratorRegistry, MetadataProvider, SqliteDialect};

/// A registry for SQLite: SQLite dialect, quoted identifiers and the
/// storage-class converters.
#[must_use]
pub fn sqlite_registry(provider: impl MetadataProvider + 'static) -> GeneratorRegistry {
    GeneratorRegistry::builder(provider)
        .dialect(SqliteDialect::new())
        .customizer(ConvertingCustomizer::sqlite())
        .build()
}
