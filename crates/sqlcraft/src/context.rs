//! Per-call execution context.

use std::panic::Location;
use std::time::Duration;

/// Options threaded through a single terminal call (fetch, count, execute).
///
/// Never consulted while building or rendering a statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecContext {
    timeout: Option<Duration>,
    caller: Option<&'static Location<'static>>,
}

impl ExecContext {
    /// A context with no deadline and no caller annotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that records the calling source location.
    ///
    /// SQL issued under it is prefixed with `/* file:line */ `.
    #[track_caller]
    pub fn here() -> Self {
        Self {
            timeout: None,
            caller: Some(Location::caller()),
        }
    }

    /// Fail the call with [`SqlError::Timeout`](crate::SqlError::Timeout) after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `file:line` of the recorded caller.
    pub fn caller(&self) -> Option<String> {
        self.caller.map(|loc| format!("{}:{}", loc.file(), loc.line()))
    }

    /// Prefix `sql` with the caller comment when one was recorded.
    pub fn annotate(&self, sql: &str) -> String {
        match self.caller() {
            Some(caller) => format!("/* {caller} */ {sql}"),
            None => sql.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_leaves_sql_alone() {
        assert_eq!(ExecContext::new().annotate("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn here_records_this_file() {
        let ctx = ExecContext::here();
        let sql = ctx.annotate("SELECT 1");
        assert!(sql.starts_with("/* "));
        assert!(sql.contains("context.rs:"));
        assert!(sql.ends_with(" */ SELECT 1"));
    }

    #[test]
    fn timeout_is_kept() {
        let ctx = ExecContext::here().with_timeout(Duration::from_millis(5));
        assert_eq!(ctx.timeout(), Some(Duration::from_millis(5)));
        assert!(ctx.caller().is_some());
    }
}
