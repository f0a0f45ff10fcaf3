//! Execution boundary.
//!
//! Statements render themselves and hand the SQL text to an [`Executor`].
//! Anything that can run a query and a statement (a connection, a
//! transaction, a test double, a wrapper adding timeouts and logging)
//! implements it.

use crate::context::ExecContext;
use crate::error::{SqlError, SqlResult};
use futures_core::Stream;
use futures_util::TryStreamExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_postgres::types::ToSql;

/// Runs rendered SQL.
pub trait Executor: Send + Sync {
    /// Row type produced by queries.
    type Row: Send + 'static;

    /// Run a query and return a cursor over its rows.
    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
    ) -> impl Future<Output = SqlResult<RowStream<Self::Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, ctx: &ExecContext, sql: &str) -> impl Future<Output = SqlResult<u64>> + Send;

    /// Run a query and collect every row.
    fn query_all(
        &self,
        ctx: &ExecContext,
        sql: &str,
    ) -> impl Future<Output = SqlResult<Vec<Self::Row>>> + Send {
        async move { self.query(ctx, sql).await?.try_collect().await }
    }
}

/// A cursor over query results.
///
/// Type-erased so every executor returns the same stream type.
#[must_use]
pub struct RowStream<R> {
    inner: Pin<Box<dyn Stream<Item = SqlResult<R>> + Send>>,
}

impl<R> RowStream<R> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = SqlResult<R>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A cursor over already materialized rows.
    pub fn from_rows(rows: Vec<R>) -> Self
    where
        R: Send + 'static,
    {
        Self::new(futures_util::stream::iter(rows.into_iter().map(Ok)))
    }
}

impl<R> Stream for RowStream<R> {
    type Item = SqlResult<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

const NO_PARAMS: [&(dyn ToSql + Sync); 0] = [];

impl Executor for tokio_postgres::Client {
    type Row = tokio_postgres::Row;

    async fn query(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<RowStream<Self::Row>> {
        let stream = tokio_postgres::Client::query_raw(self, sql, NO_PARAMS.iter().copied()).await?;
        Ok(RowStream::new(stream.map_err(SqlError::from)))
    }

    async fn execute(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, &NO_PARAMS).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    type Row = tokio_postgres::Row;

    async fn query(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<RowStream<Self::Row>> {
        let stream =
            tokio_postgres::Transaction::query_raw(self, sql, NO_PARAMS.iter().copied()).await?;
        Ok(RowStream::new(stream.map_err(SqlError::from)))
    }

    async fn execute(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, &NO_PARAMS).await?)
    }
}

impl<E: Executor> Executor for &E {
    type Row = E::Row;

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
    ) -> impl Future<Output = SqlResult<RowStream<Self::Row>>> + Send {
        (**self).query(ctx, sql)
    }

    fn execute(&self, ctx: &ExecContext, sql: &str) -> impl Future<Output = SqlResult<u64>> + Send {
        (**self).execute(ctx, sql)
    }
}

/// Await `future`, failing with a timeout error once the context deadline passes.
pub(crate) async fn with_deadline<T, F>(ctx: &ExecContext, future: F) -> SqlResult<T>
where
    F: Future<Output = SqlResult<T>>,
{
    match ctx.timeout() {
        Some(timeout) => tokio::time::timeout(timeout, future)
            .await
            .map_err(|_| SqlError::Timeout(timeout))?,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn from_rows_yields_in_order() {
        let stream = RowStream::from_rows(vec![1, 2, 3]);
        let rows: Vec<i32> = stream.try_collect().await.unwrap();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn deadline_expires() {
        let ctx = ExecContext::new().with_timeout(Duration::from_millis(10));
        let result: SqlResult<()> = with_deadline(&ctx, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn no_deadline_passes_through() {
        let result = with_deadline(&ExecContext::new(), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
