//! Per-entity statement generation.
//!
//! A [`StatementGenerator`] is built once per entity type from its metadata.
//! Construction classifies the identifier, partitions the properties into
//! the insert, update and select projections and renders the static insert
//! prefix. Every operation afterwards reads values from an instance through
//! the customized accessor and returns a bound statement:
//!
//! - inserts carry SQL with positional markers and an argument vector;
//! - updates, deletes and selects carry SQL with `:name` markers and a
//!   [`ParameterSource`].
//!
//! Generators hold no per-call state and are shared between threads.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::accessor::{
    InstanceAccessor, PropertyAccessor, PropertyAccessorCustomizer, ReadOnlyAccessor,
};
use crate::bound::{BatchInsertStatement, InsertStatement, NamedStatement, ParameterSource};
use crate::criteria::{Criteria, QueryMapper};
use crate::dialect::{Dialect, IdentifierProcessing};
use crate::error::{MapperError, Result};
use crate::render::{Assignment, BindMarker, Column, Condition, Delete, Select, SqlRenderer, Table, Update};
use crate::row::RowSource;
use crate::schema::{Entity, EntityMetadata, PersistentProperty};
use crate::value::{SqlValue, ToSqlValue};

/// Where identifier values come from on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdValueSource {
    /// The identifier column is written by inserts; when left null the
    /// database generates it and it is written back after execution.
    Generated,
    /// The caller supplies key values (no identifier property, or a
    /// non-writable one).
    Provided,
}

impl IdValueSource {
    /// Classifies an entity.
    #[must_use]
    pub fn of(entity: &EntityMetadata) -> Self {
        match entity.id_property() {
            Some(id) if id.writable => Self::Generated,
            _ => Self::Provided,
        }
    }
}

/// The type-erased, immutable part of a generator.
pub(crate) struct GeneratorState {
    entity: Arc<EntityMetadata>,
    id_value_source: IdValueSource,
    table: Table,
    insert_properties: Vec<PersistentProperty>,
    update_properties: Vec<PersistentProperty>,
    select_columns: Vec<Column>,
    insert_prefix: String,
    dialect: Arc<dyn Dialect>,
    renderer: SqlRenderer,
    customizer: Arc<dyn PropertyAccessorCustomizer>,
}

impl GeneratorState {
    pub(crate) fn new(
        entity: Arc<EntityMetadata>,
        dialect: Arc<dyn Dialect>,
        identifiers: IdentifierProcessing,
        customizer: Arc<dyn PropertyAccessorCustomizer>,
    ) -> Self {
        let table = Table::new(entity.table());
        let renderer = SqlRenderer::new(identifiers);

        let insert_properties: Vec<PersistentProperty> = entity
            .properties()
            .iter()
            .filter(|p| p.writable)
            .cloned()
            .collect();
        let update_properties: Vec<PersistentProperty> = insert_properties
            .iter()
            .filter(|p| !p.insert_only)
            .cloned()
            .collect();
        let select_columns: Vec<Column> = entity
            .properties()
            .iter()
            .map(|p| table.column(p.column))
            .collect();

        let insert_columns: Vec<String> = insert_properties
            .iter()
            .map(|p| renderer.column_name(table.column(p.column)))
            .collect();
        let insert_prefix = format!(
            "INSERT INTO {} ({}) VALUES ",
            renderer.table(table),
            insert_columns.join(", ")
        );

        Self {
            id_value_source: IdValueSource::of(&entity),
            entity,
            table,
            insert_properties,
            update_properties,
            select_columns,
            insert_prefix,
            dialect,
            renderer,
            customizer,
        }
    }

    pub(crate) fn entity(&self) -> &EntityMetadata {
        &self.entity
    }

    pub(crate) fn insert_properties(&self) -> &[PersistentProperty] {
        &self.insert_properties
    }

    pub(crate) fn update_properties(&self) -> &[PersistentProperty] {
        &self.update_properties
    }
}

/// Statement generator for the entity type `T`.
///
/// Obtained from [`GeneratorRegistry::generator`](crate::GeneratorRegistry::generator);
/// cloning is cheap and every clone shares the same cached state.
pub struct StatementGenerator<T> {
    inner: Arc<GeneratorState>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for StatementGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StatementGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementGenerator")
            .field("entity", &self.inner.entity.type_name())
            .field("table", &self.inner.table.name())
            .field("id_value_source", &self.inner.id_value_source)
            .field("dialect", &self.inner.dialect.name())
            .finish_non_exhaustive()
    }
}

impl<T: Entity> StatementGenerator<T> {
    /// Builds a generator outside of a registry.
    ///
    /// `entity` must describe `T`.
    #[must_use]
    pub fn new(
        entity: Arc<EntityMetadata>,
        dialect: Arc<dyn Dialect>,
        identifiers: IdentifierProcessing,
        customizer: Arc<dyn PropertyAccessorCustomizer>,
    ) -> Self {
        Self::from_state(Arc::new(GeneratorState::new(
            entity,
            dialect,
            identifiers,
            customizer,
        )))
    }

    pub(crate) const fn from_state(inner: Arc<GeneratorState>) -> Self {
        Self {
            inner,
            _entity: PhantomData,
        }
    }

    /// Returns true if both handles share the same generator.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The entity metadata.
    #[must_use]
    pub fn entity(&self) -> &EntityMetadata {
        &self.inner.entity
    }

    /// The mapped table.
    #[must_use]
    pub fn table(&self) -> Table {
        self.inner.table
    }

    /// How identifier values are produced.
    #[must_use]
    pub fn id_value_source(&self) -> IdValueSource {
        self.inner.id_value_source
    }

    /// The identifier property, if any.
    #[must_use]
    pub fn id_property(&self) -> Option<&PersistentProperty> {
        self.inner.entity.id_property()
    }

    /// The dialect statements are generated for.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        &*self.inner.dialect
    }

    /// `INSERT INTO <table> (<insert columns>) VALUES `, shared by every
    /// batch insert.
    #[must_use]
    pub fn insert_prefix(&self) -> &str {
        &self.inner.insert_prefix
    }

    /// Properties written by inserts, in declaration order.
    #[must_use]
    pub fn insert_properties(&self) -> &[PersistentProperty] {
        self.inner.insert_properties()
    }

    /// Properties written by updates, in declaration order.
    #[must_use]
    pub fn update_properties(&self) -> &[PersistentProperty] {
        self.inner.update_properties()
    }

    /// Columns read by selects, in declaration order.
    #[must_use]
    pub fn select_columns(&self) -> &[Column] {
        &self.inner.select_columns
    }

    /// A customized read/write accessor over `instance`.
    pub fn persistent_property_accessor<'a>(
        &self,
        instance: &'a mut T,
    ) -> Box<dyn PropertyAccessor + 'a> {
        self.inner
            .customizer
            .customize(Box::new(InstanceAccessor::new(instance)))
    }

    /// A customized accessor over a shared borrow; writes through it fail.
    pub fn read_accessor<'a>(&self, instance: &'a T) -> Box<dyn PropertyAccessor + 'a> {
        self.inner
            .customizer
            .customize(Box::new(ReadOnlyAccessor::new(instance)))
    }

    /// Inserts the non-null insert-eligible properties of `instance`.
    ///
    /// Null properties are left out of the statement so column defaults
    /// apply. The returned accessor is the one the values were read
    /// through and can write a generated identifier back.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::EmptyInsert`] when every insert-eligible
    /// property is null.
    pub fn insert_selective<'a>(&self, instance: &'a mut T) -> Result<InsertStatement<'a>> {
        let accessor = self.persistent_property_accessor(instance);
        let mut columns = Vec::new();
        let mut args = Vec::new();

        for property in &self.inner.insert_properties {
            let value = accessor.get_property(property)?;
            if value.is_null() {
                continue;
            }
            columns.push(
                self.inner
                    .renderer
                    .column_name(self.inner.table.column(property.column)),
            );
            args.push(self.bindable(property, value)?);
        }

        if args.is_empty() {
            return Err(MapperError::EmptyInsert {
                table: self.inner.table.name(),
            });
        }

        let markers: Vec<String> = (1..=args.len())
            .map(|position| self.inner.dialect.bind_marker(position))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.inner.renderer.table(self.inner.table),
            columns.join(", "),
            markers.join(", ")
        );
        trace!(table = self.inner.table.name(), sql = %sql, args = args.len(), "Generated insert");

        Ok(InsertStatement {
            sql,
            args,
            accessor,
        })
    }

    /// Inserts every instance as one multi-row statement.
    ///
    /// Each row has one slot per insert-eligible property, nulls included.
    /// Arguments are column-major (for each column, every row's value) and
    /// each slot's marker carries the position of its argument. Accessors
    /// are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::EmptyBatch`] for an empty slice and
    /// [`MapperError::EmptyInsert`] when the entity has no insert-eligible
    /// property.
    pub fn insert_list<'a>(&self, instances: &'a mut [T]) -> Result<BatchInsertStatement<'a>> {
        let table = self.inner.table.name();
        if instances.is_empty() {
            return Err(MapperError::EmptyBatch { table });
        }
        let columns = self.inner.insert_properties.len();
        if columns == 0 {
            return Err(MapperError::EmptyInsert { table });
        }

        let accessors: Vec<Box<dyn PropertyAccessor + 'a>> = instances
            .iter_mut()
            .map(|instance| self.persistent_property_accessor(instance))
            .collect();
        let rows = accessors.len();

        let mut args = Vec::with_capacity(rows * columns);
        for property in &self.inner.insert_properties {
            for accessor in &accessors {
                let value = accessor.get_property(property)?;
                args.push(self.bindable(property, value)?);
            }
        }

        let mut sql = self.inner.insert_prefix.clone();
        for row in 0..rows {
            if row > 0 {
                sql.push_str(", ");
            }
            let markers: Vec<String> = (0..columns)
                .map(|column| self.inner.dialect.bind_marker(column * rows + row + 1))
                .collect();
            sql.push('(');
            sql.push_str(&markers.join(", "));
            sql.push(')');
        }
        trace!(table, rows, args = args.len(), "Generated batch insert");

        Ok(BatchInsertStatement {
            sql,
            args,
            accessors,
        })
    }

    /// Deletes the rows matching `criteria`; every row when absent or empty.
    ///
    /// # Errors
    ///
    /// Fails when the criteria name an unknown property.
    pub fn delete_all(&self, criteria: Option<&Criteria>) -> Result<NamedStatement> {
        let mut params = ParameterSource::new();
        let mut delete = Delete::from(self.inner.table);
        if let Some(condition) = self.condition(&mut params, criteria)? {
            delete = delete.where_clause(condition);
        }
        let sql = self.inner.renderer.render_delete(&delete);
        trace!(table = self.inner.table.name(), sql = %sql, "Generated delete");
        Ok(NamedStatement { sql, params })
    }

    /// Updates the non-null update-eligible properties of `instance`, pinned
    /// to its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::NoIdentifierProperty`],
    /// [`MapperError::MissingIdentifier`] when the identifier is null, and
    /// [`MapperError::EmptyUpdate`] when nothing would be set.
    pub fn update_by_id_selective(&self, instance: &T) -> Result<NamedStatement> {
        let id = self.required_id()?;
        let accessor = self.read_accessor(instance);
        let id_value = accessor.get_property(id)?;
        if id_value.is_null() {
            return Err(MapperError::MissingIdentifier {
                entity: self.inner.entity.type_name(),
            });
        }

        let mut params = ParameterSource::new();
        let assignments = self.assignments(&*accessor, &mut params)?;
        let condition = self.id_condition(&mut params, id, id_value)?;
        let update = Update::table(self.inner.table)
            .set(assignments)
            .where_clause(condition);

        let sql = self.inner.renderer.render_update(&update);
        trace!(table = self.inner.table.name(), sql = %sql, "Generated update by id");
        Ok(NamedStatement { sql, params })
    }

    /// Updates the non-null update-eligible properties of `instance` on every
    /// row matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingCriteria`] when `criteria` is empty and
    /// [`MapperError::EmptyUpdate`] when nothing would be set.
    pub fn update(&self, instance: &T, criteria: &Criteria) -> Result<NamedStatement> {
        if criteria.is_empty() {
            return Err(MapperError::MissingCriteria {
                table: self.inner.table.name(),
            });
        }
        let accessor = self.read_accessor(instance);
        let mut params = ParameterSource::new();
        let assignments = self.assignments(&*accessor, &mut params)?;
        let condition = self
            .condition(&mut params, Some(criteria))?
            .ok_or(MapperError::MissingCriteria {
                table: self.inner.table.name(),
            })?;
        let update = Update::table(self.inner.table)
            .set(assignments)
            .where_clause(condition);

        let sql = self.inner.renderer.render_update(&update);
        trace!(table = self.inner.table.name(), sql = %sql, "Generated update");
        Ok(NamedStatement { sql, params })
    }

    /// Selects every mapped column of the rows matching `criteria`.
    ///
    /// # Errors
    ///
    /// Fails when the criteria name an unknown property.
    pub fn select(&self, criteria: Option<&Criteria>) -> Result<NamedStatement> {
        let mut params = ParameterSource::new();
        let mut select = Select::from(self.inner.table).columns(self.inner.select_columns.clone());
        if let Some(condition) = self.condition(&mut params, criteria)? {
            select = select.where_clause(condition);
        }
        let sql = self.inner.renderer.render_select(&select);
        trace!(table = self.inner.table.name(), sql = %sql, "Generated select");
        Ok(NamedStatement { sql, params })
    }

    /// Selects the row with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::NoIdentifierProperty`], or
    /// [`MapperError::MissingIdentifier`] for a null `id`.
    pub fn select_by_id<V: ToSqlValue>(&self, id: V) -> Result<NamedStatement> {
        let property = self.required_id()?;
        let value = id.to_sql_value();
        if value.is_null() {
            return Err(MapperError::MissingIdentifier {
                entity: self.inner.entity.type_name(),
            });
        }
        let mut params = ParameterSource::new();
        let condition = self.id_condition(&mut params, property, value)?;
        let select = Select::from(self.inner.table)
            .columns(self.inner.select_columns.clone())
            .where_clause(condition);
        let sql = self.inner.renderer.render_select(&select);
        trace!(table = self.inner.table.name(), sql = %sql, "Generated select by id");
        Ok(NamedStatement { sql, params })
    }

    /// Builds an instance from a result row.
    ///
    /// Every mapped column present in the row is written through the
    /// customized accessor; absent columns keep their default.
    ///
    /// # Errors
    ///
    /// Fails on undecodable columns, on values the field type rejects and
    /// on array values for dialects without array support.
    pub fn map_row<R: RowSource + ?Sized>(&self, row: &R) -> Result<T>
    where
        T: Default,
    {
        let mut instance = T::default();
        {
            let mut accessor = self.persistent_property_accessor(&mut instance);
            for property in self.inner.entity.properties() {
                let Some(value) = row.column_value(property.column)? else {
                    continue;
                };
                let value = self.bindable(property, value)?;
                accessor.set_property(property, value)?;
            }
        }
        Ok(instance)
    }

    fn bindable(&self, property: &PersistentProperty, value: SqlValue) -> Result<SqlValue> {
        if matches!(value, SqlValue::Array(_)) && !self.inner.dialect.supports_arrays() {
            return Err(MapperError::UnsupportedArray {
                dialect: self.inner.dialect.name(),
                property: property.name,
            });
        }
        Ok(value)
    }

    fn required_id(&self) -> Result<&PersistentProperty> {
        self.inner
            .entity
            .id_property()
            .ok_or(MapperError::NoIdentifierProperty {
                entity: self.inner.entity.type_name(),
            })
    }

    fn id_condition(
        &self,
        params: &mut ParameterSource,
        id: &PersistentProperty,
        value: SqlValue,
    ) -> Result<Condition> {
        let value = self.bindable(id, value)?;
        let name = params.bind(id.column, value);
        Ok(Condition::eq(
            self.inner.table.column(id.column),
            BindMarker::named(name),
        ))
    }

    fn condition(
        &self,
        params: &mut ParameterSource,
        criteria: Option<&Criteria>,
    ) -> Result<Option<Condition>> {
        match criteria {
            Some(criteria) => {
                QueryMapper::new(self.inner.table, &self.inner.entity).map(params, criteria)
            }
            None => Ok(None),
        }
    }

    fn assignments(
        &self,
        accessor: &dyn PropertyAccessor,
        params: &mut ParameterSource,
    ) -> Result<Vec<Assignment>> {
        let mut assignments = Vec::new();
        for property in &self.inner.update_properties {
            let value = accessor.get_property(property)?;
            if value.is_null() {
                continue;
            }
            let value = self.bindable(property, value)?;
            let name = params.bind(&format!("set{}", property.name), value);
            assignments.push(Assignment::new(
                self.inner.table.column(property.column),
                BindMarker::named(name),
            ));
        }
        if assignments.is_empty() {
            return Err(MapperError::EmptyUpdate {
                table: self.inner.table.name(),
            });
        }
        Ok(assignments)
    }
}
