//! Process-lifetime cache of statement generators.
//!
//! The registry is created once at startup and shared (usually in an
//! `Arc`). The first request for an entity type resolves its metadata and
//! builds the generator; concurrent first requests for the same type wait
//! on the map shard instead of building a second one. Entries are never
//! evicted.
//!
//! ```ignore
//! let registry = GeneratorRegistry::builder(MappingContext::new().with::<User>())
//!     .dialect_kind(DialectKind::Postgres)
//!     .customizer(ConvertingCustomizer::sqlite())
//!     .build();
//!
//! let users = registry.generator::<User>()?;
//! let statement = users.delete_all(None)?;
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::accessor::{CustomizerChain, PropertyAccessorCustomizer};
use crate::dialect::{Dialect, DialectKind, GenericDialect, IdentifierProcessing};
use crate::error::Result;
use crate::generator::{GeneratorState, StatementGenerator};
use crate::mapping::MetadataProvider;
use crate::schema::Entity;

/// Thread-safe map from entity type to its generator.
pub struct GeneratorRegistry {
    provider: Arc<dyn MetadataProvider>,
    dialect: Arc<dyn Dialect>,
    identifiers: IdentifierProcessing,
    customizer: Arc<dyn PropertyAccessorCustomizer>,
    generators: DashMap<TypeId, Arc<GeneratorState>>,
}

impl GeneratorRegistry {
    /// Starts configuring a registry over a metadata provider.
    pub fn builder(provider: impl MetadataProvider + 'static) -> RegistryBuilder {
        RegistryBuilder::new(Arc::new(provider))
    }

    /// A registry with the generic dialect, quoted identifiers and no
    /// customizers.
    pub fn new(provider: impl MetadataProvider + 'static) -> Self {
        Self::builder(provider).build()
    }

    /// Returns the generator for `T`, building it on first use.
    ///
    /// The metadata provider is called with the shard of `T` locked and must
    /// not call back into this registry.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error (typically
    /// [`MapperError::UnmappedEntity`](crate::MapperError::UnmappedEntity));
    /// nothing is cached in that case.
    pub fn generator<T: Entity>(&self) -> Result<StatementGenerator<T>> {
        let key = TypeId::of::<T>();

        let cached = self.generators.get(&key).map(|state| Arc::clone(state.value()));
        if let Some(state) = cached {
            return Ok(StatementGenerator::from_state(state));
        }

        let state = match self.generators.entry(key) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let entity = self
                    .provider
                    .persistent_entity(key, type_name::<T>())
                    .inspect_err(|err| {
                        debug!(entity = type_name::<T>(), error = %err, "Metadata lookup failed");
                    })?;
                let state = Arc::new(GeneratorState::new(
                    entity,
                    Arc::clone(&self.dialect),
                    self.identifiers,
                    Arc::clone(&self.customizer),
                ));
                debug!(
                    entity = state.entity().type_name(),
                    table = state.entity().table(),
                    dialect = self.dialect.name(),
                    insert_columns = state.insert_properties().len(),
                    update_columns = state.update_properties().len(),
                    "Built statement generator"
                );
                entry.insert(Arc::clone(&state));
                state
            }
        };
        Ok(StatementGenerator::from_state(state))
    }

    /// Returns true if the generator for `T` was already built.
    #[must_use]
    pub fn contains<T: Entity>(&self) -> bool {
        self.generators.contains_key(&TypeId::of::<T>())
    }

    /// Number of generators built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns true if no generator was built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// The dialect every generator renders for.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("dialect", &self.dialect.name())
            .field("identifiers", &self.identifiers)
            .field("generators", &self.generators.len())
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`GeneratorRegistry`].
pub struct RegistryBuilder {
    provider: Arc<dyn MetadataProvider>,
    dialect: Arc<dyn Dialect>,
    force_quote: bool,
    chain: CustomizerChain,
}

impl RegistryBuilder {
    fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            dialect: Arc::new(GenericDialect::new()),
            force_quote: true,
            chain: CustomizerChain::new(),
        }
    }

    /// Sets the dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// Sets the dialect by kind, e.g. parsed from configuration.
    #[must_use]
    pub fn dialect_kind(mut self, kind: DialectKind) -> Self {
        self.dialect = kind.dialect();
        self
    }

    /// Whether identifiers are quoted (default `true`).
    #[must_use]
    pub const fn force_quote(mut self, force_quote: bool) -> Self {
        self.force_quote = force_quote;
        self
    }

    /// Appends a customizer; customizers apply in the order they are added.
    #[must_use]
    pub fn customizer(mut self, customizer: impl PropertyAccessorCustomizer + 'static) -> Self {
        self.chain.push(customizer);
        self
    }

    /// Builds the registry, composing the customizer chain once.
    #[must_use]
    pub fn build(self) -> GeneratorRegistry {
        let identifiers = if self.force_quote {
            IdentifierProcessing::quoted(&*self.dialect)
        } else {
            IdentifierProcessing::none()
        };
        GeneratorRegistry {
            provider: self.provider,
            dialect: self.dialect,
            identifiers,
            customizer: self.chain.compose(),
            generators: DashMap::new(),
        }
    }
}
