//! PostgreSQL dialect.

use super::Dialect;

/// PostgreSQL dialect: `$n` bind markers and native array columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn bind_marker(&self, position: usize) -> String {
        format!("${position}")
    }

    fn supports_arrays(&self) -> bool {
        true
    }
}
