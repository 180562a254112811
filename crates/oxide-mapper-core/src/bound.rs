//! Bound statements: SQL text plus the values to bind.

use std::collections::HashMap;
use std::fmt;

use crate::accessor::PropertyAccessor;
use crate::dialect::Dialect;
use crate::error::{MapperError, Result};
use crate::value::SqlValue;

/// Named parameter values, kept in insertion order.
///
/// Names are looked up through an index, and the next free numeric suffix
/// is remembered per base name, so binding `n` values stays linear.
#[derive(Debug, Clone, Default)]
pub struct ParameterSource {
    values: Vec<(String, SqlValue)>,
    index: HashMap<String, usize>,
    next_suffix: HashMap<String, usize>,
}

impl PartialEq for ParameterSource {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

/// Turns a column or property name into a marker name: every character
/// outside `[A-Za-z0-9_]` becomes `_`, and a leading digit gets a `_` prefix.
fn marker_name(base: &str) -> String {
    let mut name = String::with_capacity(base.len() + 1);
    if !base.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        name.push('_');
    }
    name.extend(
        base.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }),
    );
    name
}

impl ParameterSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a value.
    pub fn add_value(&mut self, name: impl Into<String>, value: SqlValue) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => self.values[slot].1 = value,
            None => {
                self.index.insert(name.clone(), self.values.len());
                self.values.push((name, value));
            }
        }
    }

    /// Binds `value` under a fresh marker name derived from `base` and
    /// returns that name.
    pub fn bind(&mut self, base: &str, value: SqlValue) -> String {
        let (base, name, suffix) = self.unique(base);
        if let Some(suffix) = suffix {
            self.next_suffix.insert(base, suffix + 1);
        }
        self.add_value(name.clone(), value);
        name
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&SqlValue> {
        self.index.get(name).map(|&slot| &self.values[slot].1)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn has_value(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the marker name of `base` if unused, otherwise `base1`,
    /// `base2`, ...
    #[must_use]
    pub fn unique_name(&self, base: &str) -> String {
        self.unique(base).1
    }

    fn unique(&self, base: &str) -> (String, String, Option<usize>) {
        let base = marker_name(base);
        if !self.has_value(&base) {
            return (base.clone(), base, None);
        }
        let start = self.next_suffix.get(&base).copied().unwrap_or(1);
        let (suffix, name) = (start..)
            .map(|n| (n, format!("{base}{n}")))
            .find(|(_, candidate)| !self.has_value(candidate))
            .unwrap_or_else(|| (start, format!("{base}{start}")));
        (base, name, Some(suffix))
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates names and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// SQL with `:name` markers and their values.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedStatement {
    /// SQL text.
    pub sql: String,
    /// Values for the named markers.
    pub params: ParameterSource,
}

impl NamedStatement {
    /// Rewrites `:name` markers into the dialect's positional markers.
    ///
    /// Each distinct name gets one position; repeated names reuse it. Quoted
    /// text, quoted identifiers and `::` casts are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingParameter`] for a marker without value.
    pub fn to_positional(&self, dialect: &dyn Dialect) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut args: Vec<SqlValue> = Vec::with_capacity(self.params.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut chars = self.sql.chars().peekable();
        let mut quote: Option<char> = None;

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                sql.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    sql.push(c);
                }
                ':' if chars.peek() == Some(&':') => {
                    sql.push_str("::");
                    chars.next();
                }
                ':' if chars.peek().is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let position = match positions.get(&name) {
                        Some(&position) => position,
                        None => {
                            let value = self
                                .params
                                .value(&name)
                                .ok_or_else(|| MapperError::MissingParameter(name.clone()))?;
                            args.push(value.clone());
                            positions.insert(name, args.len());
                            args.len()
                        }
                    };
                    sql.push_str(&dialect.bind_marker(position));
                }
                other => sql.push(other),
            }
        }

        Ok((sql, args))
    }
}

impl fmt::Display for NamedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Output of a selective insert.
pub struct InsertStatement<'a> {
    /// SQL text with positional markers.
    pub sql: String,
    /// Values in marker order.
    pub args: Vec<SqlValue>,
    /// The accessor the values were read through, for writing back a
    /// generated identifier after execution.
    pub accessor: Box<dyn PropertyAccessor + 'a>,
}

impl fmt::Debug for InsertStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertStatement")
            .field("sql", &self.sql)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Output of a batch insert.
pub struct BatchInsertStatement<'a> {
    /// SQL text with positional markers.
    pub sql: String,
    /// Values in column-major order: for each insert column, for each row.
    pub args: Vec<SqlValue>,
    /// One accessor per instance, in the order the instances were given.
    pub accessors: Vec<Box<dyn PropertyAccessor + 'a>>,
}

impl fmt::Debug for BatchInsertStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchInsertStatement")
            .field("sql", &self.sql)
            .field("args", &self.args)
            .field("rows", &self.accessors.len())
            .finish()
    }
}
