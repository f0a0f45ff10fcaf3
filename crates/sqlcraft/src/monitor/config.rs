use crate::error::SqlError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a failed query is worth another attempt.
///
/// Called with the error and the number of the attempt that just failed.
pub type RetryPolicy = Arc<dyn Fn(&SqlError, u32) -> bool + Send + Sync>;

/// Configuration for [`InstrumentedExecutor`](super::InstrumentedExecutor).
///
/// Monitors only receive events once monitoring is enabled; `tracing`
/// events are emitted regardless.
#[derive(Clone)]
pub struct MonitorConfig {
    /// Per-attempt timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are reported as slow. Default 100ms.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL to this many bytes. Default 1024.
    pub max_sql_length: Option<usize>,
    /// Level for ordinary statement events. Default `DEBUG`.
    #[cfg(feature = "tracing")]
    pub log_level: tracing::Level,
    /// Whether monitors receive events.
    pub monitoring_enabled: bool,
    /// Retry policy for queries. Statements that change data are never retried.
    pub retry_policy: Option<RetryPolicy>,
    /// Upper bound on retries after the first attempt. Default 3.
    pub max_retries: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            slow_query_threshold: Some(Duration::from_millis(100)),
            max_sql_length: Some(1024),
            #[cfg(feature = "tracing")]
            log_level: tracing::Level::DEBUG,
            monitoring_enabled: false,
            retry_policy: None,
            max_retries: 3,
        }
    }
}

impl fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MonitorConfig");
        s.field("query_timeout", &self.query_timeout)
            .field("slow_query_threshold", &self.slow_query_threshold)
            .field("max_sql_length", &self.max_sql_length);
        #[cfg(feature = "tracing")]
        s.field("log_level", &self.log_level);
        s.field("monitoring_enabled", &self.monitoring_enabled)
            .field("retry_policy", &self.retry_policy.as_ref().map(|_| ".."))
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail an attempt with [`SqlError::Timeout`] after `timeout`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn without_slow_query_threshold(mut self) -> Self {
        self.slow_query_threshold = None;
        self
    }

    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Log full SQL.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    #[cfg(feature = "tracing")]
    pub fn with_log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    pub fn disable_monitoring(mut self) -> Self {
        self.monitoring_enabled = false;
        self
    }

    /// Retry failed queries while `policy` returns true.
    pub fn with_retry_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&SqlError, u32) -> bool + Send + Sync + 'static,
    {
        self.retry_policy = Some(Arc::new(policy));
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether the query attempt numbered `attempt` that failed with `err`
    /// should be retried.
    pub(crate) fn should_retry(&self, err: &SqlError, attempt: u32) -> bool {
        attempt <= self.max_retries
            && self
                .retry_policy
                .as_ref()
                .is_some_and(|policy| policy(err, attempt))
    }

    pub(crate) fn is_slow(&self, duration: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| duration > threshold)
    }
}
