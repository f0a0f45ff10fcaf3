use super::instrumented::Reporter;
use super::types::{StatementContext, StatementResult};
use crate::client::RowStream;
use crate::error::{SqlError, SqlResult};
use futures_core::Stream;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// A cursor that reports the statement once it is drained, fails or is dropped.
///
/// Also enforces whatever is left of the query timeout while rows are read.
pub(super) struct InstrumentedRowStream<R> {
    inner: RowStream<R>,
    reporter: Reporter,
    ctx: StatementContext,
    start: Instant,
    rows: usize,
    timeout: Option<(Duration, Pin<Box<tokio::time::Sleep>>)>,
    finished: bool,
}

impl<R> InstrumentedRowStream<R> {
    pub(super) fn new(
        inner: RowStream<R>,
        reporter: Reporter,
        ctx: StatementContext,
        start: Instant,
        remaining: Option<Duration>,
    ) -> Self {
        let timeout = reporter
            .config
            .query_timeout
            .zip(remaining)
            .map(|(total, left)| (total, Box::pin(tokio::time::sleep(left))));
        Self {
            inner,
            reporter,
            ctx,
            start,
            rows: 0,
            timeout,
            finished: false,
        }
    }

    fn finalize(&mut self, err: Option<&SqlError>) {
        if self.finished {
            return;
        }
        self.finished = true;
        let result = match err {
            None => StatementResult::Rows(self.rows),
            Some(e) => StatementResult::error(e.to_string()),
        };
        self.reporter
            .finish(&self.ctx, self.start.elapsed(), &result);
    }
}

impl<R> Stream for InstrumentedRowStream<R> {
    type Item = SqlResult<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Every field is Unpin, so the stream is too.
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        if let Some((total, sleep)) = this.timeout.as_mut()
            && sleep.as_mut().poll(cx).is_ready()
        {
            let err = SqlError::Timeout(*total);
            this.timeout = None;
            this.finalize(Some(&err));
            return Poll::Ready(Some(Err(err)));
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => {
                this.rows += 1;
                Poll::Ready(Some(Ok(row)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finalize(Some(&e));
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finalize(None);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> Drop for InstrumentedRowStream<R> {
    fn drop(&mut self) {
        self.finalize(None);
    }
}
