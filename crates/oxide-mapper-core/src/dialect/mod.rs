//! SQL Dialect support.
//!
//! Different databases quote identifiers and number bind markers
//! differently. This module provides a trait for dialect-specific behavior
//! and the identifier-quoting policy derived from it.

mod generic;
mod postgres;
mod sqlite;

use std::str::FromStr;
use std::sync::Arc;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::MapperError;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the positional bind marker for the 1-based `position`.
    ///
    /// Markers carry their position so that the argument order of a
    /// statement does not have to follow the textual order of its markers.
    fn bind_marker(&self, position: usize) -> String {
        format!("?{position}")
    }

    /// Returns whether the dialect supports array-typed columns.
    fn supports_arrays(&self) -> bool {
        false
    }
}

/// Identifier quoting applied uniformly to every table and column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierProcessing {
    quote: Option<char>,
}

impl IdentifierProcessing {
    /// Quotes identifiers with the dialect's quote character.
    #[must_use]
    pub fn quoted(dialect: &dyn Dialect) -> Self {
        Self {
            quote: Some(dialect.identifier_quote()),
        }
    }

    /// Leaves identifiers untouched.
    #[must_use]
    pub const fn none() -> Self {
        Self { quote: None }
    }

    /// Renders an identifier for use in SQL text.
    #[must_use]
    pub fn to_sql(&self, name: &str) -> String {
        match self.quote {
            Some(q) => {
                let escaped = name.replace(q, &format!("{q}{q}"));
                format!("{q}{escaped}{q}")
            }
            None => String::from(name),
        }
    }
}

/// Dialect selection by name, for string-driven configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    /// [`GenericDialect`]
    Generic,
    /// [`PostgresDialect`]
    Postgres,
    /// [`SqliteDialect`]
    Sqlite,
}

impl DialectKind {
    /// Creates the dialect instance.
    #[must_use]
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Generic => Arc::new(GenericDialect::new()),
            Self::Postgres => Arc::new(PostgresDialect::new()),
            Self::Sqlite => Arc::new(SqliteDialect::new()),
        }
    }
}

impl FromStr for DialectKind {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(MapperError::UnknownDialect(String::from(other))),
        }
    }
}
