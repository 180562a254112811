//! Statement trees.

use super::{BindMarker, Column, Condition, Table};

/// One `column = :marker` assignment of an UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub(crate) column: Column,
    pub(crate) value: BindMarker,
}

impl Assignment {
    /// Assigns a marker to a column.
    #[must_use]
    pub const fn new(column: Column, value: BindMarker) -> Self {
        Self { column, value }
    }
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub(crate) table: Table,
    pub(crate) condition: Option<Condition>,
}

impl Delete {
    /// Deletes from a table; without a where clause this deletes every row.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub const fn from(table: Table) -> Self {
        Self {
            table,
            condition: None,
        }
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Returns true if a WHERE clause is specified.
    #[must_use]
    pub const fn has_where_clause(&self) -> bool {
        self.condition.is_some()
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub(crate) table: Table,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) condition: Option<Condition>,
}

impl Update {
    /// Updates a table.
    #[must_use]
    pub const fn table(table: Table) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            condition: None,
        }
    }

    /// Sets the assignments.
    #[must_use]
    pub fn set(mut self, assignments: Vec<Assignment>) -> Self {
        self.assignments = assignments;
        self
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A SELECT statement over one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub(crate) table: Table,
    pub(crate) columns: Vec<Column>,
    pub(crate) condition: Option<Condition>,
}

impl Select {
    /// Selects from a table.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub const fn from(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            condition: None,
        }
    }

    /// Sets the projected columns.
    #[must_use]
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}
