//! Row objects for INSERT.

use crate::table::Table;
use crate::value::Value;

/// A record that knows its table and its values in column order.
///
/// Usually derived with `#[derive(Model)]`:
///
/// ```ignore
/// #[derive(Model)]
/// #[sqlcraft(table = "users")]
/// struct User {
///     id: i64,
///     #[sqlcraft(column = "user_name")]
///     name: String,
/// }
///
/// db.insert_into(&User::table_ref()).models(&users).execute(&client).await?;
/// ```
pub trait Model {
    /// Table the record belongs to, declaring its fields in column order.
    fn table(&self) -> Table;

    /// One value per declared field.
    fn values(&self) -> Vec<Value>;
}

impl<M: Model + ?Sized> Model for &M {
    fn table(&self) -> Table {
        (**self).table()
    }

    fn values(&self) -> Vec<Value> {
        (**self).values()
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn table(&self) -> Table {
        (**self).table()
    }

    fn values(&self) -> Vec<Value> {
        (**self).values()
    }
}
