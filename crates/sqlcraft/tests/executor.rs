//! Terminal calls against a recording executor.

use sqlcraft::{
    Database, ExecContext, Executor, FromRow, InstrumentedExecutor, MonitorConfig, Mutation, Query,
    RowStream, SqlError, SqlResult, StatsMonitor, Table,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockRow {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl FromRow<MockRow> for i64 {
    fn from_row(row: &MockRow) -> SqlResult<Self> {
        match row {
            MockRow::Int(n) => Ok(*n),
            other => Err(SqlError::decode("0", format!("expected int, got {other:?}"))),
        }
    }
}

impl FromRow<MockRow> for bool {
    fn from_row(row: &MockRow) -> SqlResult<Self> {
        match row {
            MockRow::Bool(b) => Ok(*b),
            MockRow::Int(n) => Ok(*n != 0),
            other => Err(SqlError::decode("0", format!("expected bool, got {other:?}"))),
        }
    }
}

impl FromRow<MockRow> for String {
    fn from_row(row: &MockRow) -> SqlResult<Self> {
        match row {
            MockRow::Text(s) => Ok(s.clone()),
            other => Err(SqlError::decode("0", format!("expected text, got {other:?}"))),
        }
    }
}

/// Answers every query with `rows`, every statement with `affected`, and
/// records the SQL it receives.
#[derive(Default)]
struct Recorder {
    rows: Vec<MockRow>,
    affected: u64,
    delay: Option<Duration>,
    log: Mutex<Vec<String>>,
}

impl Recorder {
    fn returning(rows: Vec<MockRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    async fn record(&self, sql: &str) {
        self.log.lock().unwrap().push(sql.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Executor for Recorder {
    type Row = MockRow;

    async fn query(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<RowStream<MockRow>> {
        self.record(sql).await;
        Ok(RowStream::from_rows(self.rows.clone()))
    }

    async fn execute(&self, _ctx: &ExecContext, sql: &str) -> SqlResult<u64> {
        self.record(sql).await;
        Ok(self.affected)
    }
}

fn users() -> Table {
    Table::with_fields("users", &["id", "name", "age"])
}

fn db() -> Database {
    Database::new("mysql")
}

#[tokio::test]
async fn fetch_all_decodes_every_row() {
    let exec = Recorder::returning(vec![
        MockRow::Text("alice".into()),
        MockRow::Text("bob".into()),
    ]);
    let users = users();
    let names: Vec<String> = db()
        .select([users.field("name")])
        .order_by([users.field("name").asc()])
        .fetch_all(&exec)
        .await
        .unwrap();

    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(exec.log(), vec!["SELECT `name` FROM `users` ORDER BY `name`"]);
}

#[tokio::test]
async fn fetch_first_and_exactly_one() {
    let users = users();
    let query = db().select([users.field("id")]).limit(1);

    let empty = Recorder::default();
    assert_eq!(query.fetch_first::<i64, _>(&empty).await.unwrap(), None);
    let err = query.fetch_exactly_one::<i64, _>(&empty).await.unwrap_err();
    assert!(err.is_not_found());

    let two = Recorder::returning(vec![MockRow::Int(1), MockRow::Int(2)]);
    assert_eq!(query.fetch_first::<i64, _>(&two).await.unwrap(), Some(1));
    let err = query.fetch_exactly_one::<i64, _>(&two).await.unwrap_err();
    assert!(matches!(err, SqlError::TooManyRows { expected: 1, got: 2 }));

    let one = Recorder::returning(vec![MockRow::Int(9)]);
    assert_eq!(query.fetch_exactly_one::<i64, _>(&one).await.unwrap(), 9);
}

#[tokio::test]
async fn decode_errors_surface() {
    let exec = Recorder::returning(vec![MockRow::Bool(true)]);
    let users = users();
    let err = db()
        .select([users.field("name")])
        .fetch_all::<String, _>(&exec)
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::Decode { .. }));
}

#[tokio::test]
async fn count_issues_count_query() {
    let exec = Recorder::returning(vec![MockRow::Int(42)]);
    let users = users();
    let adults = db()
        .select_from(&users)
        .where_(users.field("age").gt(18))
        .order_by([users.field("id").desc()]);

    assert_eq!(adults.count(&exec).await.unwrap(), 42);
    assert_eq!(
        exec.log(),
        vec!["SELECT COUNT(1) FROM `users` WHERE `age` > 18"]
    );
}

#[tokio::test]
async fn count_without_rows_is_an_error() {
    let exec = Recorder::default();
    let err = db().select_from(&users()).count(&exec).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn exists_issues_exists_query() {
    let exec = Recorder::returning(vec![MockRow::Int(1)]);
    let users = users();
    let found = db()
        .select_from(&users)
        .where_(users.field("name").eq("alice"))
        .exists(&exec)
        .await
        .unwrap();

    assert!(found);
    assert_eq!(
        exec.log(),
        vec!["SELECT EXISTS (SELECT `id`, `name`, `age` FROM `users` WHERE `name` = 'alice')"]
    );

    let none = Recorder::default();
    assert!(!db().select_from(&users).exists(&none).await.unwrap());
}

#[tokio::test]
async fn mutations_report_affected_rows() {
    let exec = Recorder {
        affected: 2,
        ..Recorder::default()
    };
    let users = users();

    let inserted = db()
        .insert_into(&users)
        .values((1, "alice", 30))
        .values((2, "bob", 25))
        .execute(&exec)
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    db().update(&users)
        .set(users.field("age"), users.field("age").add(1))
        .where_(users.field("id").eq(1))
        .execute(&exec)
        .await
        .unwrap();

    db().delete_from(&users)
        .where_(users.field("age").lt(0))
        .execute(&exec)
        .await
        .unwrap();

    assert_eq!(
        exec.log(),
        vec![
            "INSERT INTO `users` (`id`, `name`, `age`) VALUES (1, 'alice', 30), (2, 'bob', 25)",
            "UPDATE `users` SET `age` = `age` + 1 WHERE `id` = 1",
            "DELETE FROM `users` WHERE `age` < 0",
        ]
    );
}

#[tokio::test]
async fn empty_mutations_still_reach_the_executor() {
    let exec = Recorder::default();
    let users = users();
    db().update(&users).execute(&exec).await.unwrap();
    Database::new("postgres")
        .insert_into(&users)
        .fields([users.field("id")])
        .execute(&exec)
        .await
        .unwrap();

    assert_eq!(
        exec.log(),
        vec![
            "/* UPDATE without SET */ DO 0",
            "/* INSERT without VALUES */ SELECT 0",
        ]
    );
}

#[tokio::test]
async fn render_errors_never_reach_the_executor() {
    let exec = Recorder::default();
    let users = users();
    let err = db()
        .update(&users)
        .set(users.field("age"), f64::NAN)
        .execute(&exec)
        .await
        .unwrap_err();
    assert!(err.is_invalid_type());
    assert!(exec.log().is_empty());
}

#[tokio::test]
async fn caller_annotation_prefixes_sql() {
    let exec = Recorder::default();
    let users = users();
    db().delete_from(&users)
        .where_(users.field("id").eq(3))
        .with_context(ExecContext::here())
        .execute(&exec)
        .await
        .unwrap();

    let sql = &exec.log()[0];
    assert!(sql.starts_with("/* "));
    assert!(sql.contains("executor.rs:"));
    assert!(sql.ends_with(" */ DELETE FROM `users` WHERE `id` = 3"));
}

#[tokio::test]
async fn context_timeout_cancels_call() {
    let exec = Recorder {
        delay: Some(Duration::from_secs(5)),
        ..Recorder::default()
    };
    let users = users();
    let err = db()
        .select_from(&users)
        .with_context(ExecContext::new().with_timeout(Duration::from_millis(20)))
        .fetch_all::<String, _>(&exec)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn instrumented_executor_counts_statements() {
    let stats = Arc::new(StatsMonitor::new());
    let exec = InstrumentedExecutor::new(Recorder::returning(vec![MockRow::Int(5)]))
        .with_config(MonitorConfig::new().enable_monitoring())
        .with_monitor_arc(stats.clone());
    let users = users();

    assert_eq!(db().select_from(&users).count(&exec).await.unwrap(), 5);
    db().update(&users)
        .set(users.field("name"), "x")
        .execute(&exec)
        .await
        .unwrap();

    let snapshot = stats.stats();
    assert_eq!(snapshot.total_statements, 2);
    assert_eq!(snapshot.select_count, 1);
    assert_eq!(snapshot.update_count, 1);
    assert_eq!(snapshot.failed_statements, 0);
}
