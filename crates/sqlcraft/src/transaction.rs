//! Transaction helpers: macros and a savepoint handle.
//!
//! A `tokio_postgres::Transaction` is itself an [`Executor`], so statements
//! run inside a transaction simply by passing it to their terminal methods.
//!
//! # Example
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//!
//! sqlcraft::transaction!(&mut client, tx, {
//!     db.update(&accounts)
//!         .set(balance.clone(), balance.sub(100))
//!         .where_(id.eq(1))
//!         .execute(&tx)
//!         .await?;
//!     Ok(())
//! })?;
//! ```

use crate::client::{Executor, RowStream};
use crate::context::ExecContext;
use crate::error::{SqlError, SqlResult};
use std::sync::atomic::{AtomicU64, Ordering};

static SAVEPOINT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Runs the given block inside a database transaction.
///
/// Commits when the block evaluates to `Ok(_)` and rolls back on `Err(_)`.
/// The block must evaluate to `sqlcraft::SqlResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        #[allow(unused_mut)]
        let mut $tx = ($client)
            .transaction()
            .await
            .map_err($crate::SqlError::from)?;

        let __sqlcraft_tx_result: $crate::SqlResult<_> = async { $body }.await;
        match __sqlcraft_tx_result {
            Ok(value) => {
                $tx.commit().await.map_err($crate::SqlError::from)?;
                Ok(value)
            }
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::SqlError::execution(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}

/// Runs the given block inside a savepoint of an existing transaction.
///
/// Releases the savepoint on `Ok(_)`, rolls back to it on `Err(_)`. Without a
/// name an anonymous one is generated.
#[macro_export]
macro_rules! savepoint {
    ($tx:expr, $name:expr, $sp:ident, $body:block) => {{
        #[allow(unused_mut)]
        let mut $sp = ($tx).savepoint($name).await.map_err($crate::SqlError::from)?;

        let __sqlcraft_sp_result: $crate::SqlResult<_> = async { $body }.await;
        match __sqlcraft_sp_result {
            Ok(value) => {
                $sp.commit().await.map_err($crate::SqlError::from)?;
                Ok(value)
            }
            Err(error) => match $sp.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::SqlError::execution(format!(
                    "{error} (savepoint rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
    ($tx:expr, $sp:ident, $body:block) => {{
        let __sqlcraft_sp_name = $crate::transaction::next_savepoint_name();
        $crate::savepoint!($tx, &__sqlcraft_sp_name, $sp, $body)
    }};
}

/// Name for an anonymous savepoint, unique within the process.
#[doc(hidden)]
pub fn next_savepoint_name() -> String {
    let n = SAVEPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sqlcraft_sp_{n}")
}

/// A named savepoint with explicit release and rollback.
///
/// Dropping it without either rolls back to the savepoint.
pub struct Savepoint<'a> {
    inner: Option<tokio_postgres::Transaction<'a>>,
    name: String,
}

impl<'a> Savepoint<'a> {
    fn new(inner: tokio_postgres::Transaction<'a>, name: String) -> Self {
        Self {
            inner: Some(inner),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn active(&self) -> SqlResult<&tokio_postgres::Transaction<'a>> {
        self.inner
            .as_ref()
            .ok_or_else(|| SqlError::execution(format!("savepoint {} already consumed", self.name)))
    }

    /// `RELEASE SAVEPOINT name`
    pub async fn release(mut self) -> SqlResult<()> {
        if let Some(tx) = self.inner.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// `ROLLBACK TO SAVEPOINT name`
    pub async fn rollback(mut self) -> SqlResult<()> {
        if let Some(tx) = self.inner.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

impl Drop for Savepoint<'_> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "sqlcraft.sql",
                savepoint = %self.name,
                "savepoint dropped without release or rollback",
            );
        }
    }
}

impl Executor for Savepoint<'_> {
    type Row = tokio_postgres::Row;

    async fn query(&self, ctx: &ExecContext, sql: &str) -> SqlResult<RowStream<Self::Row>> {
        Executor::query(self.active()?, ctx, sql).await
    }

    async fn execute(&self, ctx: &ExecContext, sql: &str) -> SqlResult<u64> {
        Executor::execute(self.active()?, ctx, sql).await
    }
}

/// Savepoints on a running transaction.
pub trait TransactionExt {
    /// Create a savepoint named `name`.
    fn savepoint_named(
        &mut self,
        name: &str,
    ) -> impl std::future::Future<Output = SqlResult<Savepoint<'_>>> + Send;

    /// Create an automatically named savepoint.
    fn savepoint_anonymous(
        &mut self,
    ) -> impl std::future::Future<Output = SqlResult<Savepoint<'_>>> + Send;
}

impl TransactionExt for tokio_postgres::Transaction<'_> {
    async fn savepoint_named(&mut self, name: &str) -> SqlResult<Savepoint<'_>> {
        let inner = self.savepoint(name).await?;
        Ok(Savepoint::new(inner, name.to_string()))
    }

    async fn savepoint_anonymous(&mut self) -> SqlResult<Savepoint<'_>> {
        let name = next_savepoint_name();
        let inner = self.savepoint(&name).await?;
        Ok(Savepoint::new(inner, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_names_are_unique() {
        let a = next_savepoint_name();
        let b = next_savepoint_name();
        assert!(a.starts_with("sqlcraft_sp_"));
        assert_ne!(a, b);
    }
}
