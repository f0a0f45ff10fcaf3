//! SELECT builder.
//!
//! Clause order is enforced by the state parameter of [`SelectStatement`]:
//! fields, FROM, joins, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT, OFFSET and
//! locking, in that order. Every method takes `&self` and returns a new
//! statement, so a partially built statement can be branched freely.

use crate::client::Executor;
use crate::context::ExecContext;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::expression::{Expression, literal};
use crate::function::{command, count_all};
use crate::order::{OrderBy, comma_order_bys};
use crate::priority::Priority;
use crate::qb::{append_limit, append_where};
use crate::qb::state::{self, Complete, Filterable, Joinable, Limitable, Lockable, Orderable};
use crate::qb::state::{Groupable, Unionable};
use crate::qb::traits::{Query, Statement};
use crate::row::FromRow;
use crate::scope::{JoinKind, Scope};
use crate::table::{IntoTables, Table};
use crate::value::{IntoValues, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// A SELECT statement in state `S`.
#[derive(Debug, Clone)]
pub struct SelectStatement<S> {
    core: SelectCore,
    _state: PhantomData<S>,
}

/// Locking read suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Lock {
    #[default]
    None,
    Share,
    Update,
}

/// The state-independent part of a SELECT, shared by sub-selects and derived tables.
#[derive(Debug, Clone)]
pub struct SelectCore {
    ctx: ExecContext,
    first: SelectBase,
    last_union: Option<Arc<Union>>,
    order_bys: Vec<OrderBy>,
    limit: Option<u64>,
    offset: u64,
    lock: Lock,
}

/// One `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...` unit.
#[derive(Debug, Clone)]
struct SelectBase {
    scope: Scope,
    distinct: bool,
    fields: Vec<Expression>,
    where_: Option<Expression>,
    group_bys: Vec<Expression>,
    having: Option<Expression>,
}

/// A UNION branch; each branch points at the one added before it.
#[derive(Debug)]
struct Union {
    previous: Option<Arc<Union>>,
    all: bool,
    base: SelectBase,
}

fn select_fields(values: Vec<Value>) -> Vec<Expression> {
    let mut fields = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Expr(expr) => fields.push(expr),
            Value::Table(table) => {
                let declared = table.fields();
                if declared.is_empty() {
                    fields.push(table.all_columns());
                } else {
                    fields.extend(declared);
                }
            }
            other => fields.push(literal(other)),
        }
    }
    fields
}

/// Tables referenced by `fields`, deduplicated by name in first-seen order.
fn tables_of(fields: &[Expression]) -> Vec<Table> {
    let mut tables: Vec<Table> = Vec::new();
    for table in fields.iter().filter_map(Expression::source_table) {
        if !tables.iter().any(|t| t.name() == table.name()) {
            tables.push(table.clone());
        }
    }
    tables
}

impl SelectBase {
    fn new(dialect: Dialect, distinct: bool, fields: Vec<Expression>) -> Self {
        let scope = Scope::new(dialect).with_tables(tables_of(&fields));
        Self {
            scope,
            distinct,
            fields,
            where_: None,
            group_bys: Vec::new(),
            having: None,
        }
    }

    fn from_tables(dialect: Dialect, tables: Vec<Table>) -> Self {
        Self {
            scope: Scope::new(dialect).with_tables(tables),
            ..Self::new(dialect, false, Vec::new())
        }
    }

    fn render_fields(&self) -> SqlResult<String> {
        let scope = &self.scope;
        let rendered = if self.fields.is_empty() {
            if scope.tables().is_empty() {
                return Ok("*".to_string());
            }
            scope
                .tables()
                .iter()
                .map(|t| t.fields_sql(scope))
                .collect::<SqlResult<Vec<_>>>()?
        } else {
            self.fields
                .iter()
                .map(|f| f.render(scope))
                .collect::<SqlResult<Vec<_>>>()?
        };
        Ok(rendered.join(", "))
    }

    /// Whether the field list contains `*` or `table.*`.
    fn selects_all_columns(&self) -> bool {
        self.render_fields().is_ok_and(|fields| {
            fields
                .split(", ")
                .any(|column| column == "*" || column.ends_with(".*"))
        })
    }

    fn render_into(&self, sql: &mut String) -> SqlResult<()> {
        let scope = &self.scope;
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.render_fields()?);

        if !scope.tables().is_empty() {
            let tables = scope
                .tables()
                .iter()
                .map(|t| t.render(scope))
                .collect::<SqlResult<Vec<_>>>()?;
            sql.push_str(" FROM ");
            sql.push_str(&tables.join(", "));
        }

        for join in scope.joins() {
            sql.push_str(&join.render(scope)?);
        }

        append_where(sql, scope, self.where_.as_ref())?;

        if !self.group_bys.is_empty() {
            let group_bys = self
                .group_bys
                .iter()
                .map(|e| e.render(scope))
                .collect::<SqlResult<Vec<_>>>()?;
            sql.push_str(" GROUP BY ");
            sql.push_str(&group_bys.join(", "));

            if let Some(having) = self.having.as_ref().filter(|h| !h.is_true()) {
                sql.push_str(" HAVING ");
                sql.push_str(&having.render(scope)?);
            }
        }
        Ok(())
    }
}

impl SelectCore {
    fn new(first: SelectBase) -> Self {
        Self {
            ctx: ExecContext::default(),
            first,
            last_union: None,
            order_bys: Vec::new(),
            limit: None,
            offset: 0,
            lock: Lock::None,
        }
    }

    fn dialect(&self) -> Dialect {
        self.first.scope.dialect()
    }

    /// Union branches in the order they were added.
    fn unions(&self) -> Vec<&Union> {
        let mut unions = Vec::new();
        let mut cursor = self.last_union.as_deref();
        while let Some(union) = cursor {
            unions.push(union);
            cursor = union.previous.as_deref();
        }
        unions.reverse();
        unions
    }

    /// Copy of `self` with `f` applied to the branch currently being built.
    fn with_active(&self, f: impl FnOnce(&mut SelectBase)) -> Self {
        let mut next = self.clone();
        match &self.last_union {
            Some(union) => {
                let mut base = union.base.clone();
                f(&mut base);
                next.last_union = Some(Arc::new(Union {
                    previous: union.previous.clone(),
                    all: union.all,
                    base,
                }));
            }
            None => f(&mut next.first),
        }
        next
    }

    fn with_union(&self, all: bool, base: SelectBase) -> Self {
        let mut next = self.clone();
        next.last_union = Some(Arc::new(Union {
            previous: self.last_union.clone(),
            all,
            base,
        }));
        next
    }

    /// Render the statement.
    pub fn render(&self) -> SqlResult<String> {
        let mut sql = String::with_capacity(128);
        self.first.render_into(&mut sql)?;

        for union in self.unions() {
            sql.push_str(if union.all { " UNION ALL " } else { " UNION " });
            union.base.render_into(&mut sql)?;
        }

        let scope = &self.first.scope;
        if !self.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&comma_order_bys(scope, &self.order_bys)?);
        }
        append_limit(&mut sql, self.limit);
        if self.offset != 0 {
            sql.push_str(" OFFSET ");
            sql.push_str(&self.offset.to_string());
        }
        match (self.lock, self.dialect()) {
            (Lock::None, _) => {}
            (Lock::Share, Dialect::Postgres) => sql.push_str(" FOR SHARE"),
            (Lock::Share, _) => sql.push_str(" LOCK IN SHARE MODE"),
            (Lock::Update, _) => sql.push_str(" FOR UPDATE"),
        }
        Ok(sql)
    }

    /// The statement that counts the rows `self` would return.
    ///
    /// Plain statements swap their field list for `COUNT(1)` or
    /// `COUNT(DISTINCT fields)`. Grouped, limited or unioned statements are
    /// wrapped as a derived table `t` and counted from the outside.
    fn count_query(&self) -> SelectCore {
        let mut inner = self.clone();
        inner.lock = Lock::None;

        let wrap = inner.last_union.is_some()
            || !inner.first.group_bys.is_empty()
            || inner.limit.is_some()
            || inner.offset != 0
            || (inner.first.distinct && inner.first.selects_all_columns());
        if wrap {
            if inner.last_union.is_none() && !inner.first.distinct {
                inner.first.fields = vec![Expression::raw("1")];
            }
            let dialect = inner.dialect();
            let mut outer = SelectCore::new(SelectBase::from_tables(
                dialect,
                vec![Table::derived("t", inner)],
            ));
            outer.first.fields = vec![count_all()];
            outer.ctx = self.ctx;
            return outer;
        }

        inner.order_bys.clear();
        if inner.first.distinct {
            let counted = inner.first.clone();
            inner.first.distinct = false;
            inner.first.fields = vec![Expression::computed(Priority::ATOM, move |_| {
                Ok(format!("COUNT(DISTINCT {})", counted.render_fields()?))
            })];
        } else {
            inner.first.fields = vec![count_all()];
        }
        inner
    }

    /// `SELECT EXISTS (<self>)`
    fn exists_query(&self) -> SelectCore {
        let probe = command("EXISTS", Value::Select(Arc::new(self.clone())));
        let mut outer = SelectCore::new(SelectBase::new(self.dialect(), false, vec![probe]));
        outer.ctx = self.ctx;
        outer
    }
}

impl<S> SelectStatement<S> {
    fn wrap(core: SelectCore) -> Self {
        Self {
            core,
            _state: PhantomData,
        }
    }

    fn to<T>(&self, core: SelectCore) -> SelectStatement<T> {
        SelectStatement::wrap(core)
    }
}

impl SelectStatement<state::Fields> {
    pub(crate) fn new(dialect: Dialect, distinct: bool, fields: impl IntoValues) -> Self {
        let fields = select_fields(fields.into_values());
        Self::wrap(SelectCore::new(SelectBase::new(dialect, distinct, fields)))
    }

    /// Set the FROM tables, replacing any inferred from the fields.
    pub fn from(&self, tables: impl IntoTables) -> SelectStatement<state::Tables> {
        let tables = tables.into_tables();
        self.to(self.core.with_active(|base| {
            base.scope = base.scope.with_tables(tables);
        }))
    }
}

impl SelectStatement<state::Tables> {
    pub(crate) fn new_from(dialect: Dialect, tables: impl IntoTables) -> Self {
        Self::wrap(SelectCore::new(SelectBase::from_tables(
            dialect,
            tables.into_tables(),
        )))
    }
}

impl<S: Joinable> SelectStatement<S> {
    fn push_join(&self, kind: JoinKind, table: &Table) -> SelectStatement<state::Joining> {
        self.to(self.core.with_active(|base| {
            base.scope = base.scope.push_join(kind, table.clone());
        }))
    }

    /// `JOIN table`; must be followed by [`SelectStatement::on`].
    pub fn join(&self, table: &Table) -> SelectStatement<state::Joining> {
        self.push_join(JoinKind::Inner, table)
    }

    /// `LEFT JOIN table`
    pub fn left_join(&self, table: &Table) -> SelectStatement<state::Joining> {
        self.push_join(JoinKind::Left, table)
    }

    /// `RIGHT JOIN table`
    pub fn right_join(&self, table: &Table) -> SelectStatement<state::Joining> {
        self.push_join(JoinKind::Right, table)
    }
}

impl SelectStatement<state::Joining> {
    /// Join condition for the join just added.
    pub fn on(&self, condition: impl Into<Expression>) -> SelectStatement<state::Joined> {
        let condition = condition.into();
        self.to(self.core.with_active(|base| {
            base.scope = base.scope.with_join_condition(condition);
        }))
    }
}

impl<S: Filterable> SelectStatement<S> {
    /// `WHERE condition`. The TRUE singleton omits the clause.
    pub fn where_(&self, condition: impl Into<Expression>) -> SelectStatement<state::Where> {
        let condition = condition.into();
        self.to(self.core.with_active(|base| base.where_ = Some(condition)))
    }
}

impl<S: Groupable> SelectStatement<S> {
    pub fn group_by<I>(&self, expressions: I) -> SelectStatement<state::GroupBy>
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        let group_bys: Vec<Expression> = expressions.into_iter().map(Into::into).collect();
        self.to(self.core.with_active(|base| base.group_bys = group_bys))
    }
}

impl SelectStatement<state::GroupBy> {
    pub fn having(&self, condition: impl Into<Expression>) -> SelectStatement<state::Having> {
        let condition = condition.into();
        self.to(self.core.with_active(|base| base.having = Some(condition)))
    }
}

impl<S: Unionable> SelectStatement<S> {
    fn union_with(&self, all: bool, base: SelectBase) -> SelectCore {
        self.core.with_union(all, base)
    }

    /// `UNION SELECT fields`
    pub fn union_select(&self, fields: impl IntoValues) -> SelectStatement<state::Fields> {
        let base = SelectBase::new(self.core.dialect(), false, select_fields(fields.into_values()));
        self.to(self.union_with(false, base))
    }

    /// `UNION SELECT DISTINCT fields`
    pub fn union_select_distinct(&self, fields: impl IntoValues) -> SelectStatement<state::Fields> {
        let base = SelectBase::new(self.core.dialect(), true, select_fields(fields.into_values()));
        self.to(self.union_with(false, base))
    }

    /// `UNION SELECT * FROM tables`
    pub fn union_select_from(&self, tables: impl IntoTables) -> SelectStatement<state::Tables> {
        let base = SelectBase::from_tables(self.core.dialect(), tables.into_tables());
        self.to(self.union_with(false, base))
    }

    /// `UNION ALL SELECT fields`
    pub fn union_all_select(&self, fields: impl IntoValues) -> SelectStatement<state::Fields> {
        let base = SelectBase::new(self.core.dialect(), false, select_fields(fields.into_values()));
        self.to(self.union_with(true, base))
    }

    /// `UNION ALL SELECT DISTINCT fields`
    pub fn union_all_select_distinct(
        &self,
        fields: impl IntoValues,
    ) -> SelectStatement<state::Fields> {
        let base = SelectBase::new(self.core.dialect(), true, select_fields(fields.into_values()));
        self.to(self.union_with(true, base))
    }

    /// `UNION ALL SELECT * FROM tables`
    pub fn union_all_select_from(&self, tables: impl IntoTables) -> SelectStatement<state::Tables> {
        let base = SelectBase::from_tables(self.core.dialect(), tables.into_tables());
        self.to(self.union_with(true, base))
    }
}

impl<S: Orderable> SelectStatement<S> {
    /// ORDER BY for the whole statement, after any UNION branches.
    pub fn order_by<I>(&self, order_bys: I) -> SelectStatement<state::Order>
    where
        I: IntoIterator,
        I::Item: Into<OrderBy>,
    {
        let mut core = self.core.clone();
        core.order_bys = order_bys.into_iter().map(Into::into).collect();
        self.to(core)
    }
}

impl<S: Limitable> SelectStatement<S> {
    pub fn limit(&self, limit: u64) -> SelectStatement<state::Limit> {
        let mut core = self.core.clone();
        core.limit = Some(limit);
        self.to(core)
    }
}

impl SelectStatement<state::Limit> {
    /// `OFFSET offset`; zero renders nothing.
    pub fn offset(&self, offset: u64) -> SelectStatement<state::Offset> {
        let mut core = self.core.clone();
        core.offset = offset;
        self.to(core)
    }
}

impl<S: Lockable> SelectStatement<S> {
    fn locked(&self, lock: Lock) -> SelectStatement<state::Locked> {
        let mut core = self.core.clone();
        core.lock = lock;
        self.to(core)
    }

    /// `LOCK IN SHARE MODE` (`FOR SHARE` on Postgres)
    pub fn lock_in_share_mode(&self) -> SelectStatement<state::Locked> {
        self.locked(Lock::Share)
    }

    /// `FOR UPDATE`
    pub fn for_update(&self) -> SelectStatement<state::Locked> {
        self.locked(Lock::Update)
    }
}

impl<S: Complete> SelectStatement<S> {
    /// Render the statement.
    pub fn render(&self) -> SqlResult<String> {
        self.core.render()
    }

    /// Attach an execution context used by the terminal calls.
    pub fn with_context(&self, ctx: ExecContext) -> Self {
        let mut core = self.core.clone();
        core.ctx = ctx;
        Self::wrap(core)
    }

    /// Use this statement as a derived table: `(<sql>) AS alias`.
    pub fn as_table(&self, alias: &str) -> Table {
        Table::derived(alias, self.core.clone())
    }

    /// SQL of the COUNT query issued by [`SelectStatement::count`].
    pub fn count_sql(&self) -> SqlResult<String> {
        self.core.count_query().render()
    }

    /// SQL of the EXISTS query issued by [`SelectStatement::exists`].
    pub fn exists_sql(&self) -> SqlResult<String> {
        self.core.exists_query().render()
    }

    /// Number of rows this statement would return.
    pub async fn count<E>(&self, exec: &E) -> SqlResult<i64>
    where
        E: Executor,
        i64: FromRow<E::Row>,
    {
        let query: SelectStatement<state::Fields> = SelectStatement::wrap(self.core.count_query());
        query
            .fetch_first::<i64, E>(exec)
            .await?
            .ok_or_else(|| SqlError::not_found("COUNT returned no rows"))
    }

    /// Whether this statement returns at least one row.
    pub async fn exists<E>(&self, exec: &E) -> SqlResult<bool>
    where
        E: Executor,
        bool: FromRow<E::Row>,
    {
        let query: SelectStatement<state::Fields> = SelectStatement::wrap(self.core.exists_query());
        Ok(query.fetch_first::<bool, E>(exec).await?.unwrap_or(false))
    }
}

impl<S: Complete> Statement for SelectStatement<S> {
    fn render(&self) -> SqlResult<String> {
        self.core.render()
    }

    fn exec_context(&self) -> &ExecContext {
        &self.core.ctx
    }
}

impl<S: Complete> Query for SelectStatement<S> {}

impl<S: Complete> From<SelectStatement<S>> for Value {
    fn from(select: SelectStatement<S>) -> Self {
        Value::Select(Arc::new(select.core))
    }
}

impl<S: Complete> From<&SelectStatement<S>> for Value {
    fn from(select: &SelectStatement<S>) -> Self {
        Value::Select(Arc::new(select.core.clone()))
    }
}

impl<S: Complete> From<SelectStatement<S>> for Expression {
    fn from(select: SelectStatement<S>) -> Self {
        let value = Value::from(select);
        Expression::computed(Priority::ATOM, move |scope| Ok(value.encode(scope)?.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn db() -> Database {
        Database::new("mysql")
    }

    #[test]
    fn fields_infer_from_tables() {
        let t1 = Table::new("table1");
        let t2 = Table::new("table2");
        let s = db().select((t1.field("field1"), t1.field("field2"), 123, t2.field("field3")));
        assert_eq!(
            s.render().unwrap(),
            "SELECT `table1`.`field1`, `table1`.`field2`, 123, `table2`.`field3` FROM `table1`, `table2`"
        );
    }

    #[test]
    fn single_inferred_table_uses_short_names() {
        let t1 = Table::new("table1");
        let s = db().select((t1.field("a"), t1.field("b")));
        assert_eq!(s.render().unwrap(), "SELECT `a`, `b` FROM `table1`");
    }

    #[test]
    fn table_as_field_expands_declared_fields() {
        let t1 = Table::with_fields("table1", &["id", "name"]);
        let s = db().select([t1.clone()]);
        assert_eq!(s.render().unwrap(), "SELECT `id`, `name` FROM `table1`");

        let bare = Table::new("raw");
        let t = Table::new("other");
        let s = db().select((&bare, t.field("x")));
        assert_eq!(
            s.render().unwrap(),
            "SELECT `raw`.*, `other`.`x` FROM `raw`, `other`"
        );
    }

    #[test]
    fn select_from_without_fields() {
        let t1 = Table::with_fields("table1", &["a", "b"]);
        let t2 = Table::new("table2");
        assert_eq!(
            db().select_from(&t1).render().unwrap(),
            "SELECT `a`, `b` FROM `table1`"
        );
        assert_eq!(
            db().select_from([&t1, &t2]).render().unwrap(),
            "SELECT `table1`.`a`, `table1`.`b`, `table2`.* FROM `table1`, `table2`"
        );
        assert_eq!(
            db().select_from([&Table::new("a"), &Table::new("b")])
                .render()
                .unwrap(),
            "SELECT `a`.*, `b`.* FROM `a`, `b`"
        );
        assert_eq!(
            db().select_from(&t2)
                .join(&t1)
                .on(t1.field("a").eq(t2.field("a")))
                .render()
                .unwrap(),
            "SELECT `table2`.* FROM `table2` JOIN `table1` ON `table1`.`a` = `table2`.`a`"
        );
    }

    #[test]
    fn count_variants() {
        let t = Table::new("t1");
        let f = t.field("f");

        let plain = db().select_from(&t).where_(f.gt(1)).order_by([f.desc()]);
        assert_eq!(
            plain.count_sql().unwrap(),
            "SELECT COUNT(1) FROM `t1` WHERE `f` > 1"
        );

        let distinct = db().select_distinct([&f]).from(&t);
        assert_eq!(
            distinct.count_sql().unwrap(),
            "SELECT COUNT(DISTINCT `f`) FROM `t1`"
        );

        let distinct_rows = db().select_distinct([&t]);
        assert_eq!(
            distinct_rows.count_sql().unwrap(),
            "SELECT COUNT(1) FROM (SELECT DISTINCT * FROM `t1`) AS t"
        );

        let grouped = db().select([&f]).from(&t).group_by([&f]);
        assert_eq!(
            grouped.count_sql().unwrap(),
            "SELECT COUNT(1) FROM (SELECT 1 FROM `t1` GROUP BY `f`) AS t"
        );

        let limited = db().select_from(&t).limit(10).offset(5);
        assert_eq!(
            limited.count_sql().unwrap(),
            "SELECT COUNT(1) FROM (SELECT 1 FROM `t1` LIMIT 10 OFFSET 5) AS t"
        );

        let distinct_grouped = db().select_distinct([&f]).from(&t).group_by([&f]);
        assert_eq!(
            distinct_grouped.count_sql().unwrap(),
            "SELECT COUNT(1) FROM (SELECT DISTINCT `f` FROM `t1` GROUP BY `f`) AS t"
        );
    }

    #[test]
    fn count_leaves_original_untouched() {
        let t = Table::new("t1");
        let s = db().select([t.field("f")]).from(&t).for_update();
        let before = s.render().unwrap();
        let _ = s.count_sql().unwrap();
        assert_eq!(s.render().unwrap(), before);
        assert_eq!(before, "SELECT `f` FROM `t1` FOR UPDATE");
    }

    #[test]
    fn exists_wraps_statement() {
        let t = Table::new("t1");
        let s = db().select_from(&t).where_(t.field("id").eq(1));
        assert_eq!(
            s.exists_sql().unwrap(),
            "SELECT EXISTS (SELECT * FROM `t1` WHERE `id` = 1)"
        );
    }

    #[test]
    fn lock_suffix_by_dialect() {
        let t = Table::new("t");
        assert_eq!(
            db().select_from(&t).lock_in_share_mode().render().unwrap(),
            "SELECT * FROM `t` LOCK IN SHARE MODE"
        );
        assert_eq!(
            Database::new("postgres")
                .select_from(&t)
                .lock_in_share_mode()
                .render()
                .unwrap(),
            "SELECT * FROM \"t\" FOR SHARE"
        );
    }
}
