//! Result rows as seen by row mapping.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::value::SqlValue;

/// A result row addressed by column name.
pub trait RowSource {
    /// Returns the value of a column, `None` when the row has no such column.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot decode the column.
    fn column_value(&self, column: &str) -> Result<Option<SqlValue>>;
}

impl RowSource for HashMap<String, SqlValue> {
    fn column_value(&self, column: &str) -> Result<Option<SqlValue>> {
        Ok(self.get(column).cloned())
    }
}

impl RowSource for BTreeMap<String, SqlValue> {
    fn column_value(&self, column: &str) -> Result<Option<SqlValue>> {
        Ok(self.get(column).cloned())
    }
}

impl<R: RowSource + ?Sized> RowSource for &R {
    fn column_value(&self, column: &str) -> Result<Option<SqlValue>> {
        (**self).column_value(column)
    }
}
