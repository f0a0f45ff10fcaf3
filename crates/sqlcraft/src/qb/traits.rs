//! Terminal operations shared by all statement builders.

use crate::client::{Executor, RowStream, with_deadline};
use crate::context::ExecContext;
use crate::error::{SqlError, SqlResult};
use crate::row::FromRow;
use futures_util::TryStreamExt;
use std::future::Future;

/// Base trait for all statements.
///
/// Rendering happens on every terminal call; nothing is cached.
pub trait Statement: Sync {
    /// Render the SQL text.
    fn render(&self) -> SqlResult<String>;

    /// Context handed to the executor.
    fn exec_context(&self) -> &ExecContext;

    /// The SQL actually sent: rendered text with the caller annotation, if any.
    fn annotated_sql(&self) -> SqlResult<String> {
        Ok(self.exec_context().annotate(&self.render()?))
    }
}

/// Statements that return rows.
pub trait Query: Statement {
    /// Run the query and return a cursor over its rows.
    fn fetch_cursor<E: Executor>(
        &self,
        exec: &E,
    ) -> impl Future<Output = SqlResult<RowStream<E::Row>>> + Send {
        async move {
            let sql = self.annotated_sql()?;
            let ctx = self.exec_context();
            with_deadline(ctx, exec.query(ctx, &sql)).await
        }
    }

    /// Run the query and decode every row.
    fn fetch_all<T, E>(&self, exec: &E) -> impl Future<Output = SqlResult<Vec<T>>> + Send
    where
        E: Executor,
        T: FromRow<E::Row> + Send,
    {
        async move {
            let sql = self.annotated_sql()?;
            let ctx = self.exec_context();
            let rows = with_deadline(ctx, exec.query_all(ctx, &sql)).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Run the query and decode the first row, if any.
    fn fetch_first<T, E>(&self, exec: &E) -> impl Future<Output = SqlResult<Option<T>>> + Send
    where
        E: Executor,
        T: FromRow<E::Row> + Send,
    {
        async move {
            let sql = self.annotated_sql()?;
            let ctx = self.exec_context();
            let first = with_deadline(ctx, async {
                let mut rows = exec.query(ctx, &sql).await?;
                rows.try_next().await
            })
            .await?;
            first.as_ref().map(T::from_row).transpose()
        }
    }

    /// Run the query and decode its only row.
    ///
    /// Fails with [`SqlError::NotFound`] on zero rows and
    /// [`SqlError::TooManyRows`] on more than one.
    fn fetch_exactly_one<T, E>(&self, exec: &E) -> impl Future<Output = SqlResult<T>> + Send
    where
        E: Executor,
        T: FromRow<E::Row> + Send,
    {
        async move {
            let sql = self.annotated_sql()?;
            let ctx = self.exec_context();
            let rows = with_deadline(ctx, exec.query_all(ctx, &sql)).await?;
            match rows.as_slice() {
                [] => Err(SqlError::not_found("query returned no rows")),
                [row] => T::from_row(row),
                _ => Err(SqlError::too_many_rows(1, rows.len())),
            }
        }
    }
}

/// Statements that change data (INSERT/REPLACE/UPDATE/DELETE).
pub trait Mutation: Statement {
    /// Execute and return the affected row count.
    fn execute<E: Executor>(&self, exec: &E) -> impl Future<Output = SqlResult<u64>> + Send {
        async move {
            let sql = self.annotated_sql()?;
            let ctx = self.exec_context();
            with_deadline(ctx, exec.execute(ctx, &sql)).await
        }
    }
}
