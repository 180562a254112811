//! Error types for statement generation and property access.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised while resolving metadata, reading or writing properties,
/// or generating statements.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The metadata provider has no mapping for the requested type.
    #[error("no mapping metadata registered for entity `{entity}`")]
    UnmappedEntity {
        /// Rust type name of the entity.
        entity: &'static str,
    },

    /// A property name that the entity does not declare.
    #[error("entity `{entity}` has no property `{property}`")]
    UnknownProperty {
        /// Rust type name of the entity.
        entity: &'static str,
        /// The property that was asked for.
        property: String,
    },

    /// A value could not be converted into the target Rust type.
    #[error("type mismatch: expected {expected:?}, found {found}")]
    TypeMismatch {
        /// The kind the target type accepts.
        expected: ValueKind,
        /// Short description of the value that was supplied.
        found: &'static str,
    },

    /// A write was attempted through an accessor created from a shared borrow.
    #[error("property `{property}` cannot be written through a read-only accessor")]
    ReadOnlyAccessor {
        /// The property that was written.
        property: &'static str,
    },

    /// A criteria-based update was requested without any condition.
    #[error("update of `{table}` requires at least one criteria condition")]
    MissingCriteria {
        /// Target table.
        table: &'static str,
    },

    /// A selective insert where every insert-eligible property is null.
    #[error("selective insert into `{table}` has no non-null columns")]
    EmptyInsert {
        /// Target table.
        table: &'static str,
    },

    /// A batch insert with no instances.
    #[error("batch insert into `{table}` has no rows")]
    EmptyBatch {
        /// Target table.
        table: &'static str,
    },

    /// A selective update where every update-eligible property is null.
    #[error("selective update of `{table}` has no non-null columns")]
    EmptyUpdate {
        /// Target table.
        table: &'static str,
    },

    /// An identifier-based operation on an entity without identifier property.
    #[error("entity `{entity}` has no identifier property")]
    NoIdentifierProperty {
        /// Rust type name of the entity.
        entity: &'static str,
    },

    /// An identifier-based update on an instance whose identifier is null.
    #[error("instance of `{entity}` has no identifier value")]
    MissingIdentifier {
        /// Rust type name of the entity.
        entity: &'static str,
    },

    /// A named marker in the SQL has no value in the parameter source.
    #[error("no value supplied for named parameter `{0}`")]
    MissingParameter(String),

    /// An array value reached a dialect without array columns.
    #[error("dialect `{dialect}` does not support array values (property `{property}`)")]
    UnsupportedArray {
        /// Dialect name.
        dialect: &'static str,
        /// The property carrying the array value.
        property: &'static str,
    },

    /// A driver could not decode a result column.
    #[error("cannot decode column `{column}`: {message}")]
    Decode {
        /// Column name.
        column: String,
        /// Driver message.
        message: String,
    },

    /// A dialect name that is not recognized.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
}

/// Result type alias for mapper operations.
pub type Result<T> = std::result::Result<T, MapperError>;
