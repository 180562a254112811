//! Criteria over entity properties.
//!
//! [`Criteria`] are written against Rust property names, not columns, and
//! combined with AND, OR and NOT. A [`QueryMapper`] resolves them against an
//! entity's metadata into a renderable [`Condition`], registering one named
//! parameter per value.
//!
//! ```ignore
//! use oxide_mapper_core::Criteria;
//!
//! let criteria = Criteria::eq("status", "active")
//!     .and(Criteria::gt("age", 18).or(Criteria::eq("verified", true)));
//! ```

use crate::bound::ParameterSource;
use crate::error::{MapperError, Result};
use crate::render::{BindMarker, Column, CompareOp, Condition, Table};
use crate::schema::EntityMetadata;
use crate::value::{SqlValue, ToSqlValue};

/// A filter over entity properties; possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    expr: Option<CriteriaExpr>,
}

/// Criteria expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaExpr {
    /// Simple comparison: property op value
    Comparison {
        /// Property name.
        property: String,
        /// Operator.
        op: CompareOp,
        /// Compared value.
        value: SqlValue,
    },
    /// IS NULL check
    IsNull {
        /// Property name.
        property: String,
    },
    /// IS NOT NULL check
    IsNotNull {
        /// Property name.
        property: String,
    },
    /// IN / NOT IN list check
    InList {
        /// Property name.
        property: String,
        /// List elements.
        values: Vec<SqlValue>,
        /// NOT IN when set.
        negated: bool,
    },
    /// BETWEEN range check
    Between {
        /// Property name.
        property: String,
        /// Lower bound.
        low: SqlValue,
        /// Upper bound.
        high: SqlValue,
    },
    /// AND combination
    And(Box<CriteriaExpr>, Box<CriteriaExpr>),
    /// OR combination
    Or(Box<CriteriaExpr>, Box<CriteriaExpr>),
    /// NOT negation
    Not(Box<CriteriaExpr>),
}

impl Criteria {
    const fn of(expr: CriteriaExpr) -> Self {
        Self { expr: Some(expr) }
    }

    fn compare<V: ToSqlValue>(property: &str, op: CompareOp, value: V) -> Self {
        Self::of(CriteriaExpr::Comparison {
            property: property.to_string(),
            op,
            value: value.to_sql_value(),
        })
    }

    /// Criteria without any condition.
    #[must_use]
    pub const fn empty() -> Self {
        Self { expr: None }
    }

    /// Returns true if there is no condition.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    /// Equality (property = value).
    pub fn eq<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Eq, value)
    }

    /// Inequality (property != value).
    pub fn ne<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Ne, value)
    }

    /// Greater than (property > value).
    pub fn gt<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Gt, value)
    }

    /// Greater than or equal (property >= value).
    pub fn gte<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Gte, value)
    }

    /// Less than (property < value).
    pub fn lt<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Lt, value)
    }

    /// Less than or equal (property <= value).
    pub fn lte<V: ToSqlValue>(property: &str, value: V) -> Self {
        Self::compare(property, CompareOp::Lte, value)
    }

    /// LIKE pattern match; `%` is the wildcard.
    #[must_use]
    pub fn like(property: &str, pattern: &str) -> Self {
        Self::compare(property, CompareOp::Like, pattern)
    }

    /// IS NULL.
    #[must_use]
    pub fn is_null(property: &str) -> Self {
        Self::of(CriteriaExpr::IsNull {
            property: property.to_string(),
        })
    }

    /// IS NOT NULL.
    #[must_use]
    pub fn is_not_null(property: &str) -> Self {
        Self::of(CriteriaExpr::IsNotNull {
            property: property.to_string(),
        })
    }

    /// IN list.
    pub fn in_list<V: ToSqlValue>(property: &str, values: Vec<V>) -> Self {
        Self::of(CriteriaExpr::InList {
            property: property.to_string(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            negated: false,
        })
    }

    /// NOT IN list.
    pub fn not_in_list<V: ToSqlValue>(property: &str, values: Vec<V>) -> Self {
        Self::of(CriteriaExpr::InList {
            property: property.to_string(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            negated: true,
        })
    }

    /// BETWEEN (low <= property <= high).
    pub fn between<V: ToSqlValue>(property: &str, low: V, high: V) -> Self {
        Self::of(CriteriaExpr::Between {
            property: property.to_string(),
            low: low.to_sql_value(),
            high: high.to_sql_value(),
        })
    }

    /// Combines with AND; an empty side yields the other side.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self.expr, other.expr) {
            (Some(left), Some(right)) => Self::of(CriteriaExpr::And(Box::new(left), Box::new(right))),
            (left, right) => Self { expr: left.or(right) },
        }
    }

    /// Combines with OR; an empty side yields the other side.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self.expr, other.expr) {
            (Some(left), Some(right)) => Self::of(CriteriaExpr::Or(Box::new(left), Box::new(right))),
            (left, right) => Self { expr: left.or(right) },
        }
    }

    /// Negates; empty criteria stay empty.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self {
            expr: self.expr.map(|e| CriteriaExpr::Not(Box::new(e))),
        }
    }

    /// The expression tree, `None` when empty.
    #[must_use]
    pub const fn expr(&self) -> Option<&CriteriaExpr> {
        self.expr.as_ref()
    }
}

impl From<CriteriaExpr> for Criteria {
    fn from(expr: CriteriaExpr) -> Self {
        Self::of(expr)
    }
}

/// Maps criteria onto a table.
///
/// Every value is registered in the parameter source under the column name,
/// suffixed with a number when the name is already taken.
#[derive(Debug, Clone, Copy)]
pub struct QueryMapper<'m> {
    table: Table,
    metadata: &'m EntityMetadata,
}

impl<'m> QueryMapper<'m> {
    /// Creates a mapper for an entity's table.
    #[must_use]
    pub const fn new(table: Table, metadata: &'m EntityMetadata) -> Self {
        Self { table, metadata }
    }

    /// Translates criteria into a condition, `None` when the criteria are
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::UnknownProperty`] for a property the entity
    /// does not declare.
    pub fn map(
        &self,
        params: &mut ParameterSource,
        criteria: &Criteria,
    ) -> Result<Option<Condition>> {
        criteria
            .expr()
            .map(|expr| self.map_expr(params, expr))
            .transpose()
    }

    fn column(&self, property: &str) -> Result<Column> {
        self.metadata
            .property(property)
            .map(|p| self.table.column(p.column))
            .ok_or_else(|| MapperError::UnknownProperty {
                entity: self.metadata.type_name(),
                property: property.to_string(),
            })
    }

    fn bind(params: &mut ParameterSource, column: Column, value: SqlValue) -> BindMarker {
        BindMarker::named(params.bind(column.name(), value))
    }

    fn map_expr(&self, params: &mut ParameterSource, expr: &CriteriaExpr) -> Result<Condition> {
        Ok(match expr {
            CriteriaExpr::Comparison {
                property,
                op,
                value,
            } => {
                let column = self.column(property)?;
                Condition::Comparison {
                    column,
                    op: *op,
                    value: Self::bind(params, column, value.clone()),
                }
            }
            CriteriaExpr::IsNull { property } => Condition::IsNull(self.column(property)?),
            CriteriaExpr::IsNotNull { property } => Condition::IsNotNull(self.column(property)?),
            CriteriaExpr::InList {
                property,
                values,
                negated,
            } => {
                let column = self.column(property)?;
                Condition::In {
                    column,
                    values: values
                        .iter()
                        .map(|v| Self::bind(params, column, v.clone()))
                        .collect(),
                    negated: *negated,
                }
            }
            CriteriaExpr::Between {
                property,
                low,
                high,
            } => {
                let column = self.column(property)?;
                Condition::Between {
                    column,
                    low: Self::bind(params, column, low.clone()),
                    high: Self::bind(params, column, high.clone()),
                }
            }
            CriteriaExpr::And(left, right) => {
                let left = self.map_expr(params, left)?;
                left.and(self.map_expr(params, right)?)
            }
            CriteriaExpr::Or(left, right) => {
                let left = self.map_expr(params, left)?;
                left.or(self.map_expr(params, right)?)
            }
            CriteriaExpr::Not(inner) => self.map_expr(params, inner)?.not(),
        })
    }
}
