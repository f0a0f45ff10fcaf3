//! # sqlcraft
//!
//! Immutable, dialect-aware SQL expression and statement builders.
//!
//! ## Features
//!
//! - **Values, not strings**: every builder method returns a new value; the
//!   receiver is never modified
//! - **Typestate SELECT**: clauses can only be chained in SQL order
//! - **Literal rendering**: values are encoded into the SQL text with
//!   dialect-correct quoting and minimal parentheses
//! - **Boolean folding**: `TRUE AND x` renders as `x`, an empty `IN` as `FALSE`
//! - **Pluggable execution**: statements hand their SQL to any [`Executor`]
//! - **Monitoring**: hooks, timings, retries and `tracing` logs via
//!   [`InstrumentedExecutor`]
//!
//! ## Example
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//!
//! let db = Database::new("mysql");
//! let users = Table::with_fields("users", &["id", "name", "age"]);
//!
//! let adults = db
//!     .select([users.field("name")])
//!     .from(&users)
//!     .where_(users.field("age").ge(18))
//!     .order_by([users.field("name").asc()])
//!     .limit(10);
//! assert_eq!(
//!     adults.render()?,
//!     "SELECT `name` FROM `users` WHERE `age` >= 18 ORDER BY `name` LIMIT 10"
//! );
//!
//! let names: Vec<String> = adults.fetch_all(&client).await?;
//! let total = adults.count(&client).await?;
//!
//! db.update(&users)
//!     .set(users.field("age"), users.field("age").add(1))
//!     .where_(users.field("id").eq(7))
//!     .execute(&client)
//!     .await?;
//! ```

pub mod assignment;
pub mod case;
pub mod client;
pub mod context;
pub mod database;
pub mod dialect;
pub mod error;
pub mod expression;
pub mod function;
pub mod model;
pub mod monitor;
pub mod order;
pub mod prelude;
pub mod priority;
pub mod qb;
pub mod row;
pub mod scope;
pub mod table;
pub mod transaction;
pub mod value;

pub use assignment::Assignment;
pub use case::{Case, case};
pub use client::{Executor, RowStream};
pub use context::ExecContext;
pub use database::Database;
pub use dialect::Dialect;
pub use error::{SqlError, SqlResult};
pub use expression::{Expression, and, false_, literal, not, or, raw, true_};
pub use function::{
    avg, command, concat, count, count_all, function, if_, if_null, length, max, min,
    st_as_text, st_geom_from_text, sum,
};
pub use model::Model;
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedExecutor, MonitorConfig, NoopMonitor,
    StatementContext, StatementHook, StatementKind, StatementMonitor, StatementResult,
    StatementStats, StatsMonitor,
};
pub use order::OrderBy;
pub use priority::Priority;
pub use qb::{
    DeleteStatement, InsertStatement, Mutation, Query, SelectStatement, Statement,
    UpdateStatement, delete_from, insert_into, replace_into, select, select_distinct,
    select_from, update,
};
pub use row::{FromRow, RowExt};
pub use scope::Scope;
pub use table::{IntoTables, Table};
pub use transaction::{Savepoint, TransactionExt};
pub use value::{IntoValues, Value};

#[doc(hidden)]
pub use tokio_postgres;

#[cfg(feature = "derive")]
pub use sqlcraft_derive::{FromRow, Model};
