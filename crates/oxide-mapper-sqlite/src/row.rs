//! `SqliteRow` as a [`RowSource`].

use oxide_mapper_core::{MapperError, Result, RowSource, SqlValue};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads columns of a SQLite row by their storage class.
///
/// SQLite values carry one of five storage classes regardless of the
/// declared column type; each is decoded into the matching [`SqlValue`].
/// Booleans and timestamps therefore arrive as integers and text.
#[derive(Clone, Copy)]
pub struct SqliteRowSource<'r> {
    row: &'r SqliteRow,
}

impl std::fmt::Debug for SqliteRowSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRowSource").finish_non_exhaustive()
    }
}

impl<'r> SqliteRowSource<'r> {
    /// Wraps a row.
    #[must_use]
    pub const fn new(row: &'r SqliteRow) -> Self {
        Self { row }
    }
}

fn decode_error(column: &str, err: &sqlx::Error) -> MapperError {
    MapperError::Decode {
        column: column.to_string(),
        message: err.to_string(),
    }
}

impl RowSource for SqliteRowSource<'_> {
    fn column_value(&self, column: &str) -> Result<Option<SqlValue>> {
        let raw = match self.row.try_get_raw(column) {
            Ok(raw) => raw,
            Err(sqlx::Error::ColumnNotFound(_)) => return Ok(None),
            Err(err) => return Err(decode_error(column, &err)),
        };
        if raw.is_null() {
            return Ok(Some(SqlValue::Null));
        }
        let storage = raw.type_info().name().to_string();

        let value = match storage.as_str() {
            "REAL" => self.row.try_get_unchecked::<f64, _>(column).map(SqlValue::Float),
            "TEXT" | "DATE" | "TIME" | "DATETIME" => self
                .row
                .try_get_unchecked::<String, _>(column)
                .map(SqlValue::Text),
            "BLOB" => self
                .row
                .try_get_unchecked::<Vec<u8>, _>(column)
                .map(SqlValue::Blob),
            _ => self.row.try_get_unchecked::<i64, _>(column).map(SqlValue::Int),
        };
        value.map(Some).map_err(|err| decode_error(column, &err))
    }
}
