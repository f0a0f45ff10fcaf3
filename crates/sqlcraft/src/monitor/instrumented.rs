use super::config::MonitorConfig;
use super::monitors::{CompositeHook, NoopMonitor};
use super::stream::InstrumentedRowStream;
use super::types::{HookAction, StatementContext, StatementHook, StatementKind};
use super::types::{StatementMonitor, StatementResult};
use crate::client::{Executor, RowStream};
use crate::context::ExecContext;
use crate::error::{SqlError, SqlResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Delivers statement events to the monitor, the hook and the log.
#[derive(Clone)]
pub(super) struct Reporter {
    pub(super) monitor: Arc<dyn StatementMonitor>,
    pub(super) hook: Option<Arc<dyn StatementHook>>,
    pub(super) config: MonitorConfig,
}

impl Reporter {
    pub(super) fn start(&self, ctx: &StatementContext) {
        if self.config.monitoring_enabled {
            self.monitor.on_statement_start(ctx);
        }
    }

    pub(super) fn finish(&self, ctx: &StatementContext, duration: Duration, result: &StatementResult) {
        #[cfg(feature = "tracing")]
        super::logging::log_statement(&self.config, ctx, duration, result);

        if let Some(hook) = &self.hook {
            hook.after_statement(ctx, duration, result);
        }

        if !self.config.monitoring_enabled {
            return;
        }
        self.monitor.on_statement_complete(ctx, duration, result);
        if self.config.is_slow(duration) {
            self.monitor.on_slow_statement(ctx, duration);
        }
    }
}

/// An executor wrapper adding hooks, monitoring, timeouts, query retries and
/// `tracing` logs around any [`Executor`].
///
/// ```ignore
/// let exec = InstrumentedExecutor::new(client)
///     .with_config(
///         MonitorConfig::new()
///             .with_query_timeout(Duration::from_secs(30))
///             .with_slow_query_threshold(Duration::from_millis(200))
///             .with_retry_policy(|err, _attempt| err.is_timeout())
///             .enable_monitoring(),
///     )
///     .with_monitor(StatsMonitor::new());
///
/// let n = db.select_from(&users).count(&exec).await?;
/// ```
pub struct InstrumentedExecutor<E> {
    inner: E,
    reporter: Reporter,
}

impl<E: Executor> InstrumentedExecutor<E> {
    /// Wrap `inner` with default configuration and no monitor.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            reporter: Reporter {
                monitor: Arc::new(NoopMonitor),
                hook: None,
                config: MonitorConfig::default(),
            },
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.reporter.config = config;
        self
    }

    pub fn with_monitor<M: StatementMonitor + 'static>(self, monitor: M) -> Self {
        self.with_monitor_arc(Arc::new(monitor))
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn StatementMonitor>) -> Self {
        self.reporter.monitor = monitor;
        self
    }

    /// Replace the hook.
    pub fn with_hook<H: StatementHook + 'static>(mut self, hook: H) -> Self {
        self.reporter.hook = Some(Arc::new(hook));
        self
    }

    /// Add a hook after any already set.
    pub fn add_hook<H: StatementHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    pub fn add_hook_arc(mut self, hook: Arc<dyn StatementHook>) -> Self {
        self.reporter.hook = Some(match self.reporter.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.reporter.config
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn prepare(&self, ctx: &ExecContext, sql: &str) -> SqlResult<StatementContext> {
        let mut stmt = StatementContext::new(sql).with_caller(ctx.caller());
        let Some(hook) = &self.reporter.hook else {
            return Ok(stmt);
        };
        match hook.before_statement(&stmt) {
            HookAction::Continue => Ok(stmt),
            HookAction::Rewrite(sql) => {
                stmt.kind = StatementKind::from_sql(&sql);
                stmt.sql = sql;
                Ok(stmt)
            }
            HookAction::Abort(reason) => {
                #[cfg(feature = "tracing")]
                super::logging::log_abort(&self.reporter.config, &stmt, &reason);
                Err(SqlError::Aborted(reason))
            }
        }
    }

    async fn with_timeout<T, F>(&self, future: F) -> SqlResult<T>
    where
        F: Future<Output = SqlResult<T>>,
    {
        match self.reporter.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| SqlError::Timeout(timeout))?,
            None => future.await,
        }
    }
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    type Row = E::Row;

    async fn query(&self, ctx: &ExecContext, sql: &str) -> SqlResult<RowStream<Self::Row>> {
        let mut stmt = self.prepare(ctx, sql)?;
        loop {
            self.reporter.start(&stmt);
            let start = Instant::now();
            match self.with_timeout(self.inner.query(ctx, &stmt.sql)).await {
                Ok(rows) => {
                    let remaining = self
                        .reporter
                        .config
                        .query_timeout
                        .map(|t| t.saturating_sub(start.elapsed()));
                    return Ok(RowStream::new(InstrumentedRowStream::new(
                        rows,
                        self.reporter.clone(),
                        stmt,
                        start,
                        remaining,
                    )));
                }
                Err(err) => {
                    let result = StatementResult::error(err.to_string());
                    self.reporter.finish(&stmt, start.elapsed(), &result);
                    if !self.reporter.config.should_retry(&err, stmt.attempt) {
                        return Err(err);
                    }
                    #[cfg(feature = "tracing")]
                    super::logging::log_retry(&self.reporter.config, &stmt, &err);
                    stmt.attempt += 1;
                }
            }
        }
    }

    async fn execute(&self, ctx: &ExecContext, sql: &str) -> SqlResult<u64> {
        let stmt = self.prepare(ctx, sql)?;
        self.reporter.start(&stmt);
        let start = Instant::now();
        let result = self.with_timeout(self.inner.execute(ctx, &stmt.sql)).await;
        let outcome = match &result {
            Ok(n) => StatementResult::Affected(*n),
            Err(err) => StatementResult::error(err.to_string()),
        };
        self.reporter.finish(&stmt, start.elapsed(), &outcome);
        result
    }
}
