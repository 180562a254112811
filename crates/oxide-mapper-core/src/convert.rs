//! Value coercion layered on the accessor chain.
//!
//! Drivers report values by storage class rather than by field type: SQLite
//! has no boolean or timestamp storage, so a `bool` column comes back as an
//! integer and a `NaiveDateTime` column as text. A [`ConvertingCustomizer`]
//! coerces such values before they are written into the entity.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::accessor::{PropertyAccessor, PropertyAccessorCustomizer};
use crate::error::Result;
use crate::schema::PersistentProperty;
use crate::value::{SqlValue, ValueKind};

/// Converts a value on its way into a property.
pub trait ValueConverter: Send + Sync {
    /// Returns the converted value, or the input unchanged if the converter
    /// does not apply.
    fn convert(&self, property: &PersistentProperty, value: SqlValue) -> SqlValue;
}

/// `0`/non-zero integers into booleans.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerToBoolean;

impl ValueConverter for IntegerToBoolean {
    fn convert(&self, property: &PersistentProperty, value: SqlValue) -> SqlValue {
        match (property.kind, value) {
            (ValueKind::Bool, SqlValue::Int(n)) => SqlValue::Bool(n != 0),
            (_, value) => value,
        }
    }
}

/// ISO-8601 text (`YYYY-MM-DD HH:MM:SS[.f]`, `T` separator accepted) into
/// timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextToTimestamp;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl ValueConverter for TextToTimestamp {
    fn convert(&self, property: &PersistentProperty, value: SqlValue) -> SqlValue {
        match (property.kind, value) {
            (ValueKind::Timestamp, SqlValue::Text(text)) => TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
                .map_or(SqlValue::Text(text), SqlValue::Timestamp),
            (_, value) => value,
        }
    }
}

/// Customizer that runs every written value through a list of converters.
#[derive(Clone, Default)]
pub struct ConvertingCustomizer {
    converters: Arc<Vec<Box<dyn ValueConverter>>>,
}

impl ConvertingCustomizer {
    /// Creates a customizer from converters, applied in order.
    #[must_use]
    pub fn new(converters: Vec<Box<dyn ValueConverter>>) -> Self {
        Self {
            converters: Arc::new(converters),
        }
    }

    /// The converters needed for SQLite storage classes.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(vec![Box::new(IntegerToBoolean), Box::new(TextToTimestamp)])
    }
}

struct ConvertingAccessor<'a> {
    inner: Box<dyn PropertyAccessor + 'a>,
    converters: Arc<Vec<Box<dyn ValueConverter>>>,
}

impl PropertyAccessor for ConvertingAccessor<'_> {
    fn get_property(&self, property: &PersistentProperty) -> Result<SqlValue> {
        self.inner.get_property(property)
    }

    fn set_property(&mut self, property: &PersistentProperty, value: SqlValue) -> Result<()> {
        let value = self
            .converters
            .iter()
            .fold(value, |value, converter| converter.convert(property, value));
        self.inner.set_property(property, value)
    }
}

impl PropertyAccessorCustomizer for ConvertingCustomizer {
    fn customize<'a>(
        &self,
        accessor: Box<dyn PropertyAccessor + 'a>,
    ) -> Box<dyn PropertyAccessor + 'a> {
        Box::new(ConvertingAccessor {
            inner: accessor,
            converters: Arc::clone(&self.converters),
        })
    }
}
