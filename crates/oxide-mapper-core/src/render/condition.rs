//! Boolean conditions over columns and named bind markers.

use std::fmt;

use super::Column;

/// A named bind marker, rendered as `:name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMarker {
    name: String,
}

impl BindMarker {
    /// Creates a marker for a parameter name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BindMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Pattern match (LIKE)
    Like,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
        }
    }
}

/// A renderable boolean condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `column op :marker`
    Comparison {
        /// Left-hand column.
        column: Column,
        /// Operator.
        op: CompareOp,
        /// Right-hand marker.
        value: BindMarker,
    },
    /// `column IS NULL`
    IsNull(Column),
    /// `column IS NOT NULL`
    IsNotNull(Column),
    /// `column [NOT] IN (:a, :b, ...)`
    In {
        /// Tested column.
        column: Column,
        /// One marker per list element.
        values: Vec<BindMarker>,
        /// `NOT IN` when set.
        negated: bool,
    },
    /// `column BETWEEN :low AND :high`
    Between {
        /// Tested column.
        column: Column,
        /// Lower bound.
        low: BindMarker,
        /// Upper bound.
        high: BindMarker,
    },
    /// AND combination
    And(Box<Condition>, Box<Condition>),
    /// OR combination
    Or(Box<Condition>, Box<Condition>),
    /// NOT negation
    Not(Box<Condition>),
}

impl Condition {
    /// `column = :marker`
    #[must_use]
    pub const fn eq(column: Column, value: BindMarker) -> Self {
        Self::Comparison {
            column,
            op: CompareOp::Eq,
            value,
        }
    }

    /// Combines with another condition using AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines with another condition using OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negates the condition.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}
