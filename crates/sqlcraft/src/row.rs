//! Row decoding.

use crate::error::{SqlError, SqlResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Decode one row of type `R` into `Self`.
///
/// `R` is the executor's row type, so test doubles and other drivers can
/// supply their own row representation.
pub trait FromRow<R>: Sized {
    fn from_row(row: &R) -> SqlResult<Self>;
}

/// Typed column access for `tokio_postgres::Row` with decode errors mapped
/// into [`SqlError::Decode`].
pub trait RowExt {
    fn try_get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> SqlResult<T>;
    fn try_get_index<'a, T: FromSql<'a>>(&'a self, index: usize) -> SqlResult<T>;
}

impl RowExt for Row {
    fn try_get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> SqlResult<T> {
        self.try_get(column)
            .map_err(|e| SqlError::decode(column, e.to_string()))
    }

    fn try_get_index<'a, T: FromSql<'a>>(&'a self, index: usize) -> SqlResult<T> {
        self.try_get(index)
            .map_err(|e| SqlError::decode(index.to_string(), e.to_string()))
    }
}

impl FromRow<Row> for Row {
    fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(row.clone())
    }
}

macro_rules! impl_scalar_from_row {
    ($($t:ty),* $(,)?) => {
        $(impl FromRow<Row> for $t {
            fn from_row(row: &Row) -> SqlResult<Self> {
                row.try_get_index(0)
            }
        })*
    };
}

impl_scalar_from_row!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    Vec<u8>,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
);

impl<T> FromRow<Row> for Option<T>
where
    T: for<'a> FromSql<'a>,
{
    fn from_row(row: &Row) -> SqlResult<Self> {
        row.try_get_index(0)
    }
}

macro_rules! impl_tuple_from_row {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name),+> FromRow<Row> for ($($name,)+)
        where
            $($name: for<'a> FromSql<'a>,)+
        {
            fn from_row(row: &Row) -> SqlResult<Self> {
                Ok(($(row.try_get_index::<$name>($idx)?,)+))
            }
        }
    };
}

impl_tuple_from_row!(A: 0);
impl_tuple_from_row!(A: 0, B: 1);
impl_tuple_from_row!(A: 0, B: 1, C: 2);
impl_tuple_from_row!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_from_row!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_from_row!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
