//! Statement monitoring, hooks and logging around an [`Executor`](crate::Executor).
//!
//! This module provides:
//! - [`InstrumentedExecutor`], a wrapper timing every statement
//! - hooks that can rewrite or abort SQL before it runs
//! - monitors that receive per-statement timing
//! - per-attempt timeouts and a retry policy for queries
//! - `tracing` events on target `sqlcraft.sql` (feature `tracing`)
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlcraft::monitor::{HookAction, InstrumentedExecutor, MonitorConfig, StatementContext,
//!     StatementHook, StatementKind, StatsMonitor};
//! use std::time::Duration;
//!
//! struct NoDeletes;
//!
//! impl StatementHook for NoDeletes {
//!     fn before_statement(&self, ctx: &StatementContext) -> HookAction {
//!         match ctx.kind {
//!             StatementKind::Delete => HookAction::Abort("deletes are disabled".into()),
//!             _ => HookAction::Continue,
//!         }
//!     }
//! }
//!
//! let exec = InstrumentedExecutor::new(client)
//!     .with_config(MonitorConfig::new().with_slow_query_threshold(Duration::from_millis(50)))
//!     .with_hook(NoDeletes);
//! ```

mod config;
mod instrumented;
#[cfg(feature = "tracing")]
mod logging;
mod monitors;
mod stream;
mod types;


pub use config::{MonitorConfig, RetryPolicy};
pub use instrumented::InstrumentedExecutor;
pub use monitors::{CompositeHook, CompositeMonitor, NoopMonitor, StatementStats, StatsMonitor};
pub use types::{
    HookAction, StatementContext, StatementHook, StatementKind, StatementMonitor, StatementResult,
};

/// Longest prefix of `sql` not exceeding `max_bytes` that ends on a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
