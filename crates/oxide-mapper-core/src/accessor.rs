//! Property access and the accessor customization chain.
//!
//! The statement generator never touches entity fields directly. It reads
//! and writes through a [`PropertyAccessor`] created per call, after the
//! raw accessor has been passed through the composed
//! [`PropertyAccessorCustomizer`] chain. Customizers wrap the accessor to
//! layer cross-cutting behavior (value coercion, auditing) on top of it.
//!
//! ```ignore
//! struct Audit;
//!
//! impl PropertyAccessorCustomizer for Audit {
//!     fn customize<'a>(
//!         &self,
//!         accessor: Box<dyn PropertyAccessor + 'a>,
//!     ) -> Box<dyn PropertyAccessor + 'a> {
//!         Box::new(AuditingAccessor { inner: accessor })
//!     }
//! }
//!
//! // Audit is applied first, Coerce wraps the audited accessor.
//! let chain = Audit.then(Coerce);
//! ```

use std::any::type_name;
use std::sync::Arc;

use crate::error::{MapperError, Result};
use crate::schema::{Entity, PersistentProperty};
use crate::value::SqlValue;

/// Read/write access to the properties of one entity instance.
pub trait PropertyAccessor: Send {
    /// Reads the current value of a property.
    ///
    /// # Errors
    ///
    /// Fails if the entity does not declare the property.
    fn get_property(&self, property: &PersistentProperty) -> Result<SqlValue>;

    /// Writes a property.
    ///
    /// # Errors
    ///
    /// Fails for unknown properties, unconvertible values, and accessors
    /// created over a shared borrow.
    fn set_property(&mut self, property: &PersistentProperty, value: SqlValue) -> Result<()>;
}

fn unknown<T>(property: &PersistentProperty) -> MapperError {
    MapperError::UnknownProperty {
        entity: type_name::<T>(),
        property: String::from(property.name),
    }
}

/// Accessor over an exclusively borrowed instance; supports write-back.
pub struct InstanceAccessor<'a, T> {
    instance: &'a mut T,
}

impl<'a, T: Entity> InstanceAccessor<'a, T> {
    /// Wraps an instance.
    pub fn new(instance: &'a mut T) -> Self {
        Self { instance }
    }
}

impl<T: Entity> PropertyAccessor for InstanceAccessor<'_, T> {
    fn get_property(&self, property: &PersistentProperty) -> Result<SqlValue> {
        self.instance
            .read_property(property.name)
            .ok_or_else(|| unknown::<T>(property))
    }

    fn set_property(&mut self, property: &PersistentProperty, value: SqlValue) -> Result<()> {
        self.instance.write_property(property.name, value)
    }
}

/// Accessor over a shared borrow; writes fail.
pub struct ReadOnlyAccessor<'a, T> {
    instance: &'a T,
}

impl<'a, T: Entity> ReadOnlyAccessor<'a, T> {
    /// Wraps an instance.
    pub const fn new(instance: &'a T) -> Self {
        Self { instance }
    }
}

impl<T: Entity> PropertyAccessor for ReadOnlyAccessor<'_, T> {
    fn get_property(&self, property: &PersistentProperty) -> Result<SqlValue> {
        self.instance
            .read_property(property.name)
            .ok_or_else(|| unknown::<T>(property))
    }

    fn set_property(&mut self, property: &PersistentProperty, _value: SqlValue) -> Result<()> {
        Err(MapperError::ReadOnlyAccessor {
            property: property.name,
        })
    }
}

/// A transform applied to every accessor before the generator uses it.
pub trait PropertyAccessorCustomizer: Send + Sync {
    /// Wraps (or replaces) an accessor.
    fn customize<'a>(&self, accessor: Box<dyn PropertyAccessor + 'a>)
        -> Box<dyn PropertyAccessor + 'a>;

    /// Composes two customizers: `self` is applied first, then `next`.
    fn then<N>(self, next: N) -> Then<Self, N>
    where
        Self: Sized,
        N: PropertyAccessorCustomizer,
    {
        Then { first: self, next }
    }
}

/// The customizer that returns the accessor unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl PropertyAccessorCustomizer for Identity {
    fn customize<'a>(
        &self,
        accessor: Box<dyn PropertyAccessor + 'a>,
    ) -> Box<dyn PropertyAccessor + 'a> {
        accessor
    }
}

/// Composition of two customizers, see [`PropertyAccessorCustomizer::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    next: B,
}

impl<A, B> PropertyAccessorCustomizer for Then<A, B>
where
    A: PropertyAccessorCustomizer,
    B: PropertyAccessorCustomizer,
{
    fn customize<'a>(
        &self,
        accessor: Box<dyn PropertyAccessor + 'a>,
    ) -> Box<dyn PropertyAccessor + 'a> {
        self.next.customize(self.first.customize(accessor))
    }
}

impl<C: PropertyAccessorCustomizer + ?Sized> PropertyAccessorCustomizer for Arc<C> {
    fn customize<'a>(
        &self,
        accessor: Box<dyn PropertyAccessor + 'a>,
    ) -> Box<dyn PropertyAccessor + 'a> {
        (**self).customize(accessor)
    }
}

/// Ordered list of registered customizers.
#[derive(Clone, Default)]
pub struct CustomizerChain {
    customizers: Vec<Arc<dyn PropertyAccessorCustomizer>>,
}

impl CustomizerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a customizer; registration order is application order.
    pub fn push<C: PropertyAccessorCustomizer + 'static>(&mut self, customizer: C) {
        self.customizers.push(Arc::new(customizer));
    }

    /// Appends an already shared customizer.
    pub fn push_shared(&mut self, customizer: Arc<dyn PropertyAccessorCustomizer>) {
        self.customizers.push(customizer);
    }

    /// Number of registered customizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.customizers.len()
    }

    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.customizers.is_empty()
    }

    /// Folds the chain into one customizer, [`Identity`] when empty.
    #[must_use]
    pub fn compose(self) -> Arc<dyn PropertyAccessorCustomizer> {
        let identity: Arc<dyn PropertyAccessorCustomizer> = Arc::new(Identity);
        self.customizers
            .into_iter()
            .fold(
                identity,
                |composed, next| -> Arc<dyn PropertyAccessorCustomizer> {
                    Arc::new(composed.then(next))
                },
            )
    }
}

impl std::fmt::Debug for CustomizerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomizerChain")
            .field("len", &self.customizers.len())
            .finish()
    }
}
