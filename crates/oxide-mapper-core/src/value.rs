//! SQL values and conversions between Rust field types and bind values.
//!
//! Every mapped property is read as a [`SqlValue`] and written back from one.
//! `ToSqlValue` turns a field into a bind value, `FromSqlValue` turns a
//! value read from a row (or a generated key) back into the field type.

use chrono::NaiveDateTime;

use crate::error::{MapperError, Result};

/// A SQL value that can be bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
    /// Array value, only bindable on dialects with array columns.
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns a short name of the value's variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
        }
    }
}

/// The kind of value a mapped Rust type holds.
///
/// Carried by every persistent property so that converters can coerce
/// driver values (e.g. SQLite integers into booleans) before they reach
/// the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `bool`
    Bool,
    /// Signed and unsigned integers.
    Int,
    /// `f32` / `f64`
    Float,
    /// `String`
    Text,
    /// `Vec<u8>`
    Blob,
    /// `chrono::NaiveDateTime`
    Timestamp,
    /// Arrays.
    Array,
    /// Any value, for fields typed as `SqlValue`.
    Any,
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Trait for types that can be built from SQL values.
pub trait FromSqlValue: Sized {
    /// The kind of value this type accepts.
    const KIND: ValueKind;

    /// Converts a SQL value into this type.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::TypeMismatch`] when the value has the wrong
    /// variant or does not fit into the target type.
    fn from_sql_value(value: SqlValue) -> Result<Self>;
}

fn mismatch(expected: ValueKind, value: &SqlValue) -> MapperError {
    MapperError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

impl FromSqlValue for SqlValue {
    const KIND: ValueKind = ValueKind::Any;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        Ok(value)
    }
}

impl FromSqlValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

macro_rules! impl_from_sql_int {
    ($($ty:ty),+) => {
        $(
            impl FromSqlValue for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn from_sql_value(value: SqlValue) -> Result<Self> {
                    match value {
                        SqlValue::Int(n) => <$ty>::try_from(n).map_err(|_| MapperError::TypeMismatch {
                            expected: Self::KIND,
                            found: "out-of-range int",
                        }),
                        other => Err(mismatch(Self::KIND, &other)),
                    }
                }
            }
        )+
    };
}

impl_from_sql_int!(i64, i32, i16, i8, u32, u16, u8);

impl FromSqlValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(f) => Ok(f),
            SqlValue::Int(n) => Ok(n as f64),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FromSqlValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        f64::from_sql_value(value).map(|f| f as f32)
    }
}

impl FromSqlValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) => Ok(s),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Blob;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::Timestamp;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_from_sql_value_option() {
        assert_eq!(Option::<i64>::from_sql_value(SqlValue::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::from_sql_value(SqlValue::Int(7)).unwrap(),
            Some(7)
        );
        assert_eq!(<Option<bool> as FromSqlValue>::KIND, ValueKind::Bool);
    }

    #[test]
    fn test_from_sql_value_mismatch() {
        let err = bool::from_sql_value(SqlValue::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            MapperError::TypeMismatch {
                expected: ValueKind::Bool,
                found: "int"
            }
        ));
    }

    #[test]
    fn test_from_sql_value_int_out_of_range() {
        assert!(u8::from_sql_value(SqlValue::Int(300)).is_err());
        assert_eq!(i16::from_sql_value(SqlValue::Int(-12)).unwrap(), -12);
    }

    #[test]
    fn test_float_accepts_int() {
        assert!((f64::from_sql_value(SqlValue::Int(3)).unwrap() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_is_null() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::Text(String::new()).is_null());
    }
}
