use std::fmt;
use std::time::Duration;

/// The kind of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    /// Anything else, including the no-op statements rendered for empty
    /// INSERTs and UPDATEs.
    Other,
}

impl StatementKind {
    /// Detect the statement kind from its leading keyword.
    ///
    /// Leading `/* ... */` comments (caller annotations) are skipped. The
    /// no-op statements rendered for empty INSERTs and UPDATEs are `Other`.
    pub fn from_sql(sql: &str) -> Self {
        let mut rest = sql.trim_start();
        while let Some(after) = rest.strip_prefix("/*") {
            let Some(end) = after.find("*/") else {
                return StatementKind::Other;
            };
            if NOOP_MARKERS.contains(&after[..end].trim()) {
                return StatementKind::Other;
            }
            rest = after[end + 2..].trim_start();
        }
        let keyword = rest
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or_default();
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => StatementKind::Select,
            "INSERT" => StatementKind::Insert,
            "REPLACE" => StatementKind::Replace,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            _ => StatementKind::Other,
        }
    }
}

const NOOP_MARKERS: [&str; 3] = [
    "INSERT without VALUES",
    "REPLACE without VALUES",
    "UPDATE without SET",
];

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Replace => "replace",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// What the executor is about to run.
#[derive(Debug, Clone)]
pub struct StatementContext {
    /// SQL handed to the inner executor, after any hook rewrite.
    pub sql: String,
    pub kind: StatementKind,
    /// `file:line` of the call site, when the caller recorded one.
    pub caller: Option<String>,
    /// 1 for the first try, incremented on every retry.
    pub attempt: u32,
}

impl StatementContext {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            kind: StatementKind::from_sql(sql),
            caller: None,
            attempt: 1,
        }
    }

    pub fn with_caller(mut self, caller: Option<String>) -> Self {
        self.caller = caller;
        self
    }
}

/// Maximum length for error messages in `StatementResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of one statement, as reported to monitors and hooks.
#[derive(Debug, Clone)]
pub enum StatementResult {
    /// Query cursor drained (or dropped) after yielding this many rows.
    Rows(usize),
    /// Statement affected this many rows.
    Affected(u64),
    /// Failure, message truncated to 512 bytes.
    Error(String),
}

impl StatementResult {
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatementResult::Error(_))
    }
}

impl fmt::Display for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementResult::Rows(n) => write!(f, "{n} rows"),
            StatementResult::Affected(n) => write!(f, "{n} affected"),
            StatementResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Receives timing for every statement run through an
/// [`InstrumentedExecutor`](super::InstrumentedExecutor).
pub trait StatementMonitor: Send + Sync {
    fn on_statement_start(&self, _ctx: &StatementContext) {}

    /// Called once per attempt, success or failure.
    fn on_statement_complete(
        &self,
        ctx: &StatementContext,
        duration: Duration,
        result: &StatementResult,
    );

    /// Called after `on_statement_complete` when the slow threshold is exceeded.
    fn on_slow_statement(&self, _ctx: &StatementContext, _duration: Duration) {}
}

/// Decision returned by [`StatementHook::before_statement`].
#[derive(Debug, Clone)]
pub enum HookAction {
    Continue,
    /// Run this SQL instead.
    Rewrite(String),
    /// Fail the call with [`SqlError::Aborted`](crate::SqlError::Aborted).
    Abort(String),
}

/// Interceptor around statement execution.
///
/// Hooks may inspect, rewrite or reject SQL before it reaches the inner
/// executor.
pub trait StatementHook: Send + Sync {
    fn before_statement(&self, ctx: &StatementContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    fn after_statement(
        &self,
        _ctx: &StatementContext,
        _duration: Duration,
        _result: &StatementResult,
    ) {
    }
}
