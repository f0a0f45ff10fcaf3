//! Statement builders.
//!
//! Every builder is an immutable value: each clause method returns a new
//! statement and leaves the receiver untouched, so partial statements can be
//! shared and extended independently.
//!
//! # Usage
//!
//! ```ignore
//! use sqlcraft::{Database, Table};
//! use sqlcraft::prelude::*;
//!
//! let db = Database::new("mysql");
//! let users = Table::with_fields("users", &["id", "name", "status"]);
//!
//! // SELECT
//! let active = db
//!     .select((users.field("id"), users.field("name")))
//!     .where_(users.field("status").eq("active"))
//!     .order_by([users.field("id").desc()])
//!     .limit(20);
//! let rows: Vec<(i64, String)> = active.fetch_all(&client).await?;
//!
//! // INSERT
//! db.insert_into(&users)
//!     .values((1, "alice", "active"))
//!     .execute(&client)
//!     .await?;
//!
//! // UPDATE
//! db.update(&users)
//!     .set(users.field("status"), "inactive")
//!     .where_(users.field("id").eq(1))
//!     .execute(&client)
//!     .await?;
//!
//! // DELETE
//! db.delete_from(&users)
//!     .where_(users.field("id").eq(1))
//!     .execute(&client)
//!     .await?;
//! ```

mod delete;
mod insert;
mod select;
pub mod state;
mod traits;
mod update;

pub use delete::DeleteStatement;
pub use insert::{InsertStatement, insert_state};
pub use select::{SelectCore, SelectStatement};
pub use traits::{Mutation, Query, Statement};
pub use update::UpdateStatement;

use crate::database::Database;
use crate::error::SqlResult;
use crate::expression::Expression;
use crate::scope::Scope;
use crate::table::{IntoTables, Table};
use crate::value::IntoValues;

/// `SELECT fields` in the default dialect.
pub fn select(fields: impl IntoValues) -> SelectStatement<state::Fields> {
    Database::default().select(fields)
}

/// `SELECT DISTINCT fields` in the default dialect.
pub fn select_distinct(fields: impl IntoValues) -> SelectStatement<state::Fields> {
    Database::default().select_distinct(fields)
}

/// `SELECT * FROM tables` in the default dialect.
pub fn select_from(tables: impl IntoTables) -> SelectStatement<state::Tables> {
    Database::default().select_from(tables)
}

/// `INSERT INTO table` in the default dialect.
pub fn insert_into(table: &Table) -> InsertStatement<insert_state::Start> {
    Database::default().insert_into(table)
}

/// `REPLACE INTO table` in the default dialect.
pub fn replace_into(table: &Table) -> InsertStatement<insert_state::Start> {
    Database::default().replace_into(table)
}

/// `UPDATE table` in the default dialect.
pub fn update(table: &Table) -> UpdateStatement {
    Database::default().update(table)
}

/// `DELETE FROM table` in the default dialect.
pub fn delete_from(table: &Table) -> DeleteStatement {
    Database::default().delete_from(table)
}

/// Append ` WHERE <condition>`.
///
/// Nothing is appended for a missing condition or the TRUE singleton. The
/// FALSE singleton is written out as ` WHERE FALSE` instead of being dropped.
pub(crate) fn append_where(
    sql: &mut String,
    scope: &Scope,
    condition: Option<&Expression>,
) -> SqlResult<()> {
    let Some(condition) = condition else {
        return Ok(());
    };
    if condition.is_true() {
        return Ok(());
    }
    if condition.is_false() {
        sql.push_str(" WHERE FALSE");
        return Ok(());
    }
    sql.push_str(" WHERE ");
    sql.push_str(&condition.render(scope)?);
    Ok(())
}

/// Append ` LIMIT n` when a limit is set.
pub(crate) fn append_limit(sql: &mut String, limit: Option<u64>) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ");
        sql.push_str(&limit.to_string());
    }
}
