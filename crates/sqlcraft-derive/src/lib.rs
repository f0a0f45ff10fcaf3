//! Derive macros for sqlcraft
//!
//! Provides `#[derive(Model)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod model;

/// Derive `Model` for a struct, making it usable as an INSERT row.
///
/// # Example
///
/// ```ignore
/// use sqlcraft::Model;
///
/// #[derive(Clone, Model)]
/// #[sqlcraft(table = "users")]
/// struct User {
///     id: i64,
///     #[sqlcraft(column = "user_name")]
///     name: String,
///     #[sqlcraft(skip)]
///     cached: Option<String>,
/// }
///
/// db.insert_into(&User::table_ref()).models(&users);
/// ```
///
/// # Generated
///
/// - `TABLE: &'static str` - Table name
/// - `FIELDS: &'static [&'static str]` - Column names in declaration order
/// - `fn table_ref() -> Table` - The table declaring those columns
/// - `impl Model` - Values are cloned from the fields, in the same order
///
/// # Attributes
///
/// - `#[sqlcraft(table = "name")]` - Table name, defaults to the snake_case struct name
/// - `#[sqlcraft(column = "name")]` - Map field to a different column name
/// - `#[sqlcraft(skip)]` - Field is not a column
#[proc_macro_derive(Model, attributes(sqlcraft))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow<tokio_postgres::Row>` for a struct.
///
/// # Example
///
/// ```ignore
/// use sqlcraft::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     #[sqlcraft(column = "user_name")]
///     name: String,
/// }
/// ```
///
/// Columns are looked up by name. `#[sqlcraft(skip)]` fields are filled
/// with `Default::default()`.
#[proc_macro_derive(FromRow, attributes(sqlcraft))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
