//! Statement trees and their rendering to SQL text.
//!
//! Update, delete and select statements are assembled as small trees of
//! [`Table`], [`Column`] and [`Condition`] values bound to named markers,
//! then rendered by a [`SqlRenderer`] that applies the dialect's identifier
//! quoting to every reference.
//!
//! # Example
//!
//! ```rust
//! use oxide_mapper_core::dialect::{GenericDialect, IdentifierProcessing};
//! use oxide_mapper_core::render::{BindMarker, Condition, Delete, SqlRenderer, Table};
//!
//! let table = Table::new("users");
//! let delete = Delete::from(table)
//!     .where_clause(Condition::eq(table.column("id"), BindMarker::named("id")));
//! let renderer = SqlRenderer::new(IdentifierProcessing::quoted(&GenericDialect::new()));
//!
//! assert_eq!(
//!     renderer.render_delete(&delete),
//!     "DELETE FROM \"users\" WHERE \"users\".\"id\" = :id"
//! );
//! ```

mod condition;
mod statement;

pub use condition::{BindMarker, CompareOp, Condition};
pub use statement::{Assignment, Delete, Select, Update};

use crate::dialect::IdentifierProcessing;

/// A table reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    name: &'static str,
}

impl Table {
    /// Creates a table reference.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Table name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// A column of this table.
    #[must_use]
    pub const fn column(&self, name: &'static str) -> Column {
        Column { table: *self, name }
    }
}

/// A column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    table: Table,
    name: &'static str,
}

impl Column {
    /// Column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The owning table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }
}

/// Renders statement trees with a fixed identifier policy.
#[derive(Debug, Clone, Copy)]
pub struct SqlRenderer {
    identifiers: IdentifierProcessing,
}

impl SqlRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(identifiers: IdentifierProcessing) -> Self {
        Self { identifiers }
    }

    /// The identifier policy in use.
    #[must_use]
    pub const fn identifiers(&self) -> IdentifierProcessing {
        self.identifiers
    }

    /// Renders a table name.
    #[must_use]
    pub fn table(&self, table: Table) -> String {
        self.identifiers.to_sql(table.name)
    }

    /// Renders an unqualified column name.
    #[must_use]
    pub fn column_name(&self, column: Column) -> String {
        self.identifiers.to_sql(column.name)
    }

    /// Renders a table-qualified column reference.
    #[must_use]
    pub fn qualified_column(&self, column: Column) -> String {
        format!(
            "{}.{}",
            self.identifiers.to_sql(column.table.name),
            self.identifiers.to_sql(column.name)
        )
    }

    /// Renders a DELETE statement.
    #[must_use]
    pub fn render_delete(&self, delete: &Delete) -> String {
        let mut sql = format!("DELETE FROM {}", self.table(delete.table));
        self.push_where(&mut sql, delete.condition.as_ref());
        sql
    }

    /// Renders an UPDATE statement.
    #[must_use]
    pub fn render_update(&self, update: &Update) -> String {
        let assignments: Vec<String> = update
            .assignments
            .iter()
            .map(|a| format!("{} = {}", self.column_name(a.column), a.value))
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.table(update.table),
            assignments.join(", ")
        );
        self.push_where(&mut sql, update.condition.as_ref());
        sql
    }

    /// Renders a SELECT statement.
    #[must_use]
    pub fn render_select(&self, select: &Select) -> String {
        let columns: Vec<String> = select
            .columns
            .iter()
            .map(|c| self.qualified_column(*c))
            .collect();
        let mut sql = format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            self.table(select.table)
        );
        self.push_where(&mut sql, select.condition.as_ref());
        sql
    }

    /// Renders a condition.
    #[must_use]
    pub fn render_condition(&self, condition: &Condition) -> String {
        match condition {
            Condition::Comparison { column, op, value } => {
                format!("{} {op} {value}", self.qualified_column(*column))
            }
            Condition::IsNull(column) => format!("{} IS NULL", self.qualified_column(*column)),
            Condition::IsNotNull(column) => {
                format!("{} IS NOT NULL", self.qualified_column(*column))
            }
            Condition::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // Nothing is in an empty list; everything is outside it.
                    return String::from(if *negated { "1 = 1" } else { "1 = 0" });
                }
                let markers: Vec<String> = values.iter().map(ToString::to_string).collect();
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!(
                    "{} {keyword} ({})",
                    self.qualified_column(*column),
                    markers.join(", ")
                )
            }
            Condition::Between { column, low, high } => format!(
                "{} BETWEEN {low} AND {high}",
                self.qualified_column(*column)
            ),
            Condition::And(left, right) => format!(
                "({}) AND ({})",
                self.render_condition(left),
                self.render_condition(right)
            ),
            Condition::Or(left, right) => format!(
                "({}) OR ({})",
                self.render_condition(left),
                self.render_condition(right)
            ),
            Condition::Not(inner) => format!("NOT ({})", self.render_condition(inner)),
        }
    }

    fn push_where(&self, sql: &mut String, condition: Option<&Condition>) {
        if let Some(condition) = condition {
            sql.push_str(" WHERE ");
            sql.push_str(&self.render_condition(condition));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn renderer() -> SqlRenderer {
        SqlRenderer::new(IdentifierProcessing::quoted(&GenericDialect::new()))
    }

    const USERS: Table = Table::new("users");

    #[test]
    fn test_delete_all() {
        assert_eq!(
            renderer().render_delete(&Delete::from(USERS)),
            "DELETE FROM \"users\""
        );
    }

    #[test]
    fn test_update_with_where() {
        let update = Update::table(USERS)
            .set(vec![
                Assignment::new(USERS.column("name"), BindMarker::named("setname")),
                Assignment::new(USERS.column("email"), BindMarker::named("setemail")),
            ])
            .where_clause(Condition::eq(USERS.column("id"), BindMarker::named("id")));
        assert_eq!(
            renderer().render_update(&update),
            "UPDATE \"users\" SET \"name\" = :setname, \"email\" = :setemail \
             WHERE \"users\".\"id\" = :id"
        );
    }

    #[test]
    fn test_select() {
        let select = Select::from(USERS).columns(vec![USERS.column("id"), USERS.column("name")]);
        assert_eq!(
            renderer().render_select(&select),
            "SELECT \"users\".\"id\", \"users\".\"name\" FROM \"users\""
        );
    }

    #[test]
    fn test_complex_condition() {
        let condition = Condition::eq(USERS.column("status"), BindMarker::named("status")).and(
            Condition::Comparison {
                column: USERS.column("age"),
                op: CompareOp::Gt,
                value: BindMarker::named("age"),
            }
            .or(Condition::IsNull(USERS.column("deleted_at"))),
        );
        assert_eq!(
            renderer().render_condition(&condition),
            "(\"users\".\"status\" = :status) AND \
             ((\"users\".\"age\" > :age) OR (\"users\".\"deleted_at\" IS NULL))"
        );
    }

    #[test]
    fn test_in_list() {
        let condition = Condition::In {
            column: USERS.column("role"),
            values: vec![BindMarker::named("role"), BindMarker::named("role1")],
            negated: false,
        };
        assert_eq!(
            renderer().render_condition(&condition),
            "\"users\".\"role\" IN (:role, :role1)"
        );
    }

    #[test]
    fn test_empty_in_list() {
        let condition = Condition::In {
            column: USERS.column("role"),
            values: vec![],
            negated: false,
        };
        assert_eq!(renderer().render_condition(&condition), "1 = 0");
        let negated = Condition::In {
            column: USERS.column("role"),
            values: vec![],
            negated: true,
        };
        assert_eq!(renderer().render_condition(&negated), "1 = 1");
    }

    #[test]
    fn test_unquoted_identifiers() {
        let renderer = SqlRenderer::new(IdentifierProcessing::none());
        let delete = Delete::from(USERS)
            .where_clause(Condition::eq(USERS.column("id"), BindMarker::named("id")).not());
        assert_eq!(
            renderer.render_delete(&delete),
            "DELETE FROM users WHERE NOT (users.id = :id)"
        );
    }
}
