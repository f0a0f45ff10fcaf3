//! Convenient imports for typical `sqlcraft` usage.
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//! ```
//!
//! Brings the builders, the expression helpers and the terminal traits
//! ([`Query`], [`Mutation`]) into scope.

pub use crate::{
    Database, ExecContext, Executor, Expression, FromRow, Model, Mutation, Query, RowExt,
    SqlError, SqlResult, Statement, Table, TransactionExt, Value, and, case, false_, literal,
    not, or, raw, true_,
};
