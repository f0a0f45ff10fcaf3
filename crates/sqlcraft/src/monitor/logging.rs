//! `tracing` events for executed statements, on target `sqlcraft.sql`.

use super::config::MonitorConfig;
use super::truncate_sql_bytes;
use super::types::{StatementContext, StatementResult};
use crate::error::SqlError;
use std::borrow::Cow;
use std::time::Duration;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

fn display_sql<'a>(config: &MonitorConfig, sql: &'a str) -> Cow<'a, str> {
    match config.max_sql_length {
        Some(max) if sql.len() > max => Cow::Owned(format!("{}...", truncate_sql_bytes(sql, max))),
        _ => Cow::Borrowed(sql),
    }
}

/// One event per finished attempt: `ERROR` on failure, `WARN` when slow,
/// the configured level otherwise.
pub(super) fn log_statement(
    config: &MonitorConfig,
    ctx: &StatementContext,
    duration: Duration,
    result: &StatementResult,
) {
    let level = if result.is_error() {
        Level::ERROR
    } else if config.is_slow(duration) {
        Level::WARN
    } else {
        config.log_level
    };
    let sql = display_sql(config, &ctx.sql);
    let caller = ctx.caller.as_deref().unwrap_or("-");
    let elapsed_ms = duration.as_secs_f64() * 1000.0;
    let slow = config.is_slow(duration);
    emit_at_level!(
        level,
        target: "sqlcraft.sql",
        kind = %ctx.kind,
        caller,
        attempt = ctx.attempt,
        elapsed_ms,
        slow,
        result = %result,
        sql = %sql,
    );
}

/// A failed query is about to be retried.
pub(super) fn log_retry(config: &MonitorConfig, ctx: &StatementContext, err: &SqlError) {
    let sql = display_sql(config, &ctx.sql);
    tracing::warn!(
        target: "sqlcraft.sql",
        kind = %ctx.kind,
        attempt = ctx.attempt,
        error = %err,
        sql = %sql,
        "retrying query",
    );
}

/// A hook rejected the statement before execution.
pub(super) fn log_abort(config: &MonitorConfig, ctx: &StatementContext, reason: &str) {
    let sql = display_sql(config, &ctx.sql);
    tracing::warn!(
        target: "sqlcraft.sql",
        kind = %ctx.kind,
        reason,
        sql = %sql,
        "statement aborted by hook",
    );
}
