use super::types::{HookAction, StatementContext, StatementHook, StatementKind};
use super::types::{StatementMonitor, StatementResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl StatementMonitor for NoopMonitor {
    fn on_statement_complete(
        &self,
        _ctx: &StatementContext,
        _duration: Duration,
        _result: &StatementResult,
    ) {
    }
}

/// A monitor that counts statements and keeps the slowest one.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    total_statements: AtomicU64,
    failed_statements: AtomicU64,
    total_duration_nanos: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_statement: Mutex<Option<String>>,
}

/// Snapshot of [`StatsMonitor`] counters.
#[derive(Debug, Clone, Default)]
pub struct StatementStats {
    pub total_statements: u64,
    pub failed_statements: u64,
    pub total_duration: Duration,
    pub select_count: u64,
    /// INSERT and REPLACE.
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    pub max_duration: Duration,
    pub slowest_statement: Option<String>,
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StatementStats {
        StatementStats {
            total_statements: self.total_statements.load(Ordering::Relaxed),
            failed_statements: self.failed_statements.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_statement: self
                .slowest_statement
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.total_statements,
            &self.failed_statements,
            &self.total_duration_nanos,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self
            .slowest_statement
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl StatementMonitor for StatsMonitor {
    fn on_statement_complete(
        &self,
        ctx: &StatementContext,
        duration: Duration,
        result: &StatementResult,
    ) {
        let duration_nanos = nanos(duration);

        self.total_statements.fetch_add(1, Ordering::Relaxed);
        let prev_total = self
            .total_duration_nanos
            .fetch_add(duration_nanos, Ordering::Relaxed);
        if prev_total.checked_add(duration_nanos).is_none() {
            self.total_duration_nanos.store(u64::MAX, Ordering::Relaxed);
        }

        let counter = match ctx.kind {
            StatementKind::Select => Some(&self.select_count),
            StatementKind::Insert | StatementKind::Replace => Some(&self.insert_count),
            StatementKind::Update => Some(&self.update_count),
            StatementKind::Delete => Some(&self.delete_count),
            StatementKind::Other => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        if result.is_error() {
            self.failed_statements.fetch_add(1, Ordering::Relaxed);
        }

        let mut current_max = self.max_duration_nanos.load(Ordering::Relaxed);
        while duration_nanos > current_max {
            match self.max_duration_nanos.compare_exchange_weak(
                current_max,
                duration_nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    *self
                        .slowest_statement
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(ctx.sql.clone());
                    break;
                }
                Err(updated) => current_max = updated,
            }
        }
    }
}

/// A monitor that forwards to several monitors in order.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn StatementMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<M: StatementMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitors.push(Arc::new(monitor));
        self
    }

    pub fn add_arc(mut self, monitor: Arc<dyn StatementMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }
}

impl StatementMonitor for CompositeMonitor {
    fn on_statement_start(&self, ctx: &StatementContext) {
        for monitor in &self.monitors {
            monitor.on_statement_start(ctx);
        }
    }

    fn on_statement_complete(
        &self,
        ctx: &StatementContext,
        duration: Duration,
        result: &StatementResult,
    ) {
        for monitor in &self.monitors {
            monitor.on_statement_complete(ctx, duration, result);
        }
    }

    fn on_slow_statement(&self, ctx: &StatementContext, duration: Duration) {
        for monitor in &self.monitors {
            monitor.on_slow_statement(ctx, duration);
        }
    }
}

/// Runs several hooks in order.
///
/// Each hook sees the SQL as rewritten by the hooks before it; the first
/// abort wins.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn StatementHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<H: StatementHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn add_arc(mut self, hook: Arc<dyn StatementHook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl StatementHook for CompositeHook {
    fn before_statement(&self, ctx: &StatementContext) -> HookAction {
        let mut current = ctx.clone();
        for hook in &self.hooks {
            match hook.before_statement(&current) {
                HookAction::Continue => {}
                HookAction::Rewrite(sql) => {
                    current.kind = StatementKind::from_sql(&sql);
                    current.sql = sql;
                }
                action @ HookAction::Abort(_) => return action,
            }
        }
        if current.sql != ctx.sql {
            HookAction::Rewrite(current.sql)
        } else {
            HookAction::Continue
        }
    }

    fn after_statement(
        &self,
        ctx: &StatementContext,
        duration: Duration,
        result: &StatementResult,
    ) {
        for hook in &self.hooks {
            hook.after_statement(ctx, duration, result);
        }
    }
}
