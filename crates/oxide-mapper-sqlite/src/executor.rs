//! Statement execution against a SQLite pool.

use std::sync::Arc;

use oxide_mapper_core::{
    BatchInsertStatement, Criteria, Entity, GeneratorRegistry, IdValueSource, InsertStatement,
    NamedStatement, PersistentProperty, SqlValue, StatementGenerator, ToSqlValue,
};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Sqlite;
use tracing::debug;

use crate::error::{ExecutorError, Result};
use crate::row::SqliteRowSource;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Runs generated statements on a SQLite pool.
///
/// Generators are looked up in the shared registry on every call, so one
/// executor serves every mapped entity type.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(sqlite_registry(MappingContext::new().with::<User>()));
/// let executor = SqliteExecutor::new(pool, registry);
///
/// let mut user = User { name: Some("alice".into()), ..User::default() };
/// executor.insert_selective(&mut user).await?;
/// assert!(user.id.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
    registry: Arc<GeneratorRegistry>,
}

impl SqliteExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(pool: SqlitePool, registry: Arc<GeneratorRegistry>) -> Self {
        Self { pool, registry }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Inserts the non-null properties of `instance`.
    ///
    /// When the identifier is generated and was left null, the new rowid is
    /// written back into `instance`; the identifier column must therefore be
    /// an `INTEGER PRIMARY KEY` (a rowid alias). Returns the number of rows
    /// inserted.
    ///
    /// # Errors
    ///
    /// Fails if the entity is unmapped, every property is null, or the
    /// database rejects the statement.
    pub async fn insert_selective<T: Entity>(&self, instance: &mut T) -> Result<u64> {
        let generator = self.registry.generator::<T>()?;
        let InsertStatement {
            sql,
            args,
            mut accessor,
        } = generator.insert_selective(instance)?;

        debug!(sql = %sql, "Executing SQL");
        let result = bind_all(sqlx::query(&sql), args)?
            .execute(&self.pool)
            .await?;

        if let Some(id) = generated_id(&generator) {
            if accessor.get_property(id)?.is_null() {
                let rowid = result.last_insert_rowid();
                accessor.set_property(id, SqlValue::Int(rowid))?;
                debug!(table = generator.table().name(), id = rowid, "Wrote back generated identifier");
            }
        }
        Ok(result.rows_affected())
    }

    /// Inserts every instance with one multi-row statement.
    ///
    /// When the identifier is generated and null on every instance, the
    /// rowids SQLite assigned to the statement are written back in input
    /// order; the identifier column must be an `INTEGER PRIMARY KEY` (a
    /// rowid alias). If only some instances carry an identifier, nothing is
    /// written back since the rowids of the others cannot be told apart.
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Fails if the entity is unmapped, `instances` is empty, or the
    /// database rejects the statement.
    pub async fn insert_list<T: Entity>(&self, instances: &mut [T]) -> Result<u64> {
        let generator = self.registry.generator::<T>()?;
        let BatchInsertStatement {
            sql,
            args,
            mut accessors,
        } = generator.insert_list(instances)?;

        debug!(sql = %sql, rows = accessors.len(), "Executing SQL");
        let result = bind_all(sqlx::query(&sql), args)?
            .execute(&self.pool)
            .await?;

        if let Some(id) = generated_id(&generator) {
            let mut provided = 0_usize;
            for accessor in &accessors {
                if !accessor.get_property(id)?.is_null() {
                    provided += 1;
                }
            }
            if provided > 0 {
                debug!(
                    table = generator.table().name(),
                    rows = accessors.len(),
                    provided,
                    "Skipped identifier write-back: some identifiers were provided"
                );
            } else {
                // One statement gets consecutive rowids ending at the last one.
                let mut rowid = result.last_insert_rowid();
                for accessor in accessors.iter_mut().rev() {
                    accessor.set_property(id, SqlValue::Int(rowid))?;
                    rowid -= 1;
                }
                debug!(
                    table = generator.table().name(),
                    rows = accessors.len(),
                    "Wrote back generated identifiers"
                );
            }
        }
        Ok(result.rows_affected())
    }

    /// Updates the non-null properties of `instance` by identifier.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Fails if the identifier is missing, nothing would be set, or the
    /// database rejects the statement.
    pub async fn update_by_id_selective<T: Entity>(&self, instance: &T) -> Result<u64> {
        let generator = self.registry.generator::<T>()?;
        let statement = generator.update_by_id_selective(instance)?;
        self.execute(&statement).await
    }

    /// Updates the non-null properties of `instance` on every matching row.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Fails with [`MapperError::MissingCriteria`](oxide_mapper_core::MapperError::MissingCriteria)
    /// for empty criteria, and on database errors.
    pub async fn update<T: Entity>(&self, instance: &T, criteria: &Criteria) -> Result<u64> {
        let generator = self.registry.generator::<T>()?;
        let statement = generator.update(instance, criteria)?;
        self.execute(&statement).await
    }

    /// Deletes the matching rows, every row without criteria.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Fails on unknown criteria properties and on database errors.
    pub async fn delete_all<T: Entity>(&self, criteria: Option<&Criteria>) -> Result<u64> {
        let generator = self.registry.generator::<T>()?;
        let statement = generator.delete_all(criteria)?;
        self.execute(&statement).await
    }

    /// Loads every matching row.
    ///
    /// # Errors
    ///
    /// Fails on database errors and on rows that do not map onto `T`.
    pub async fn find_all<T: Entity + Default>(
        &self,
        criteria: Option<&Criteria>,
    ) -> Result<Vec<T>> {
        let generator = self.registry.generator::<T>()?;
        let statement = generator.select(criteria)?;
        let rows = self.fetch_all(&statement).await?;
        rows.iter()
            .map(|row| {
                generator
                    .map_row(&SqliteRowSource::new(row))
                    .map_err(ExecutorError::from)
            })
            .collect()
    }

    /// Loads the row with the given identifier.
    ///
    /// # Errors
    ///
    /// Fails for entities without identifier, on database errors and on
    /// rows that do not map onto `T`.
    pub async fn find_by_id<T: Entity + Default, V: ToSqlValue + Send>(
        &self,
        id: V,
    ) -> Result<Option<T>> {
        let generator = self.registry.generator::<T>()?;
        let statement = generator.select_by_id(id)?;
        let rows = self.fetch_all(&statement).await?;
        rows.first()
            .map(|row| {
                generator
                    .map_row(&SqliteRowSource::new(row))
                    .map_err(ExecutorError::from)
            })
            .transpose()
    }

    async fn execute(&self, statement: &NamedStatement) -> Result<u64> {
        let (sql, args) = statement.to_positional(self.registry.dialect())?;
        debug!(sql = %sql, "Executing SQL");
        let result = bind_all(sqlx::query(&sql), args)?
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, statement: &NamedStatement) -> Result<Vec<SqliteRow>> {
        let (sql, args) = statement.to_positional(self.registry.dialect())?;
        debug!(sql = %sql, "Executing SQL");
        Ok(bind_all(sqlx::query(&sql), args)?
            .fetch_all(&self.pool)
            .await?)
    }
}

fn generated_id<T: Entity>(
    generator: &StatementGenerator<T>,
) -> Option<&PersistentProperty> {
    match generator.id_value_source() {
        IdValueSource::Generated => generator.id_property(),
        IdValueSource::Provided => None,
    }
}

fn bind_all(query: SqliteQuery<'_>, args: Vec<SqlValue>) -> Result<SqliteQuery<'_>> {
    args.into_iter().try_fold(query, bind_value)
}

/// Binds a SqlValue parameter to a query.
fn bind_value(query: SqliteQuery<'_>, value: SqlValue) -> Result<SqliteQuery<'_>> {
    Ok(match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
        SqlValue::Timestamp(ts) => query.bind(ts),
        SqlValue::Array(_) => return Err(ExecutorError::UnsupportedValue("array")),
    })
}
