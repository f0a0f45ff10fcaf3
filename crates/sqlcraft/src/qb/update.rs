//! UPDATE builder.

use crate::assignment::{Assignment, comma_assignments};
use crate::context::ExecContext;
use crate::error::SqlResult;
use crate::expression::Expression;
use crate::order::{OrderBy, comma_order_bys};
use crate::qb::traits::{Mutation, Statement};
use crate::qb::{append_limit, append_where};
use crate::scope::Scope;
use crate::table::Table;
use crate::value::Value;
use std::sync::Arc;

/// `UPDATE table SET ... [WHERE ...] [ORDER BY ...] [LIMIT n]`
///
/// WHERE, ORDER BY and LIMIT are optional. An UPDATE without any `SET`
/// renders a commented no-op statement instead of failing.
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    scope: Scope,
    table: Table,
    assignments: Vec<Assignment>,
    where_: Option<Expression>,
    order_bys: Vec<OrderBy>,
    limit: Option<u64>,
    ctx: ExecContext,
}

impl UpdateStatement {
    pub(crate) fn new(scope: Scope, table: Table) -> Self {
        Self {
            scope: scope.with_tables(vec![table.clone()]),
            table,
            assignments: Vec::new(),
            where_: None,
            order_bys: Vec::new(),
            limit: None,
            ctx: ExecContext::default(),
        }
    }

    /// Add `field = value` to the SET list.
    pub fn set(&self, field: impl Into<Expression>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.assignments
            .push(Assignment::new(field.into(), value.into()));
        next
    }

    /// [`UpdateStatement::set`] when `condition` holds, otherwise an unchanged copy.
    pub fn set_if(
        &self,
        condition: bool,
        field: impl Into<Expression>,
        value: impl Into<Value>,
    ) -> Self {
        if condition {
            self.set(field, value)
        } else {
            self.clone()
        }
    }

    pub fn where_(&self, condition: impl Into<Expression>) -> Self {
        Self {
            where_: Some(condition.into()),
            ..self.clone()
        }
    }

    pub fn order_by<I>(&self, order_bys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OrderBy>,
    {
        Self {
            order_bys: order_bys.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    pub fn limit(&self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }

    /// Attach an execution context used by [`Mutation::execute`].
    pub fn with_context(&self, ctx: ExecContext) -> Self {
        Self {
            ctx,
            ..self.clone()
        }
    }

    pub fn render(&self) -> SqlResult<String> {
        let scope = &self.scope;
        if self.assignments.is_empty() {
            return Ok(format!(
                "/* UPDATE without SET */ {}",
                scope.dialect().noop_statement()
            ));
        }

        let mut sql = String::with_capacity(128);
        sql.push_str("UPDATE ");
        sql.push_str(&self.table.render(scope)?);
        sql.push_str(" SET ");
        sql.push_str(&comma_assignments(scope, &self.assignments)?);

        append_where(&mut sql, scope, self.where_.as_ref())?;

        if !self.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&comma_order_bys(scope, &self.order_bys)?);
        }
        append_limit(&mut sql, self.limit);
        Ok(sql)
    }
}

impl Statement for UpdateStatement {
    fn render(&self) -> SqlResult<String> {
        UpdateStatement::render(self)
    }

    fn exec_context(&self) -> &ExecContext {
        &self.ctx
    }
}

impl Mutation for UpdateStatement {}

impl From<UpdateStatement> for Value {
    fn from(update: UpdateStatement) -> Self {
        Value::Update(Arc::new(update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::expression::{false_, true_};

    fn users() -> Table {
        Table::with_fields("users", &["id", "name", "visits"])
    }

    #[test]
    fn full_update() {
        let t = users();
        let sql = Database::new("mysql")
            .update(&t)
            .set(t.field("visits"), t.field("visits").add(1))
            .set(t.field("name"), "bob")
            .where_(t.field("id").eq(2))
            .order_by([t.field("id").desc()])
            .limit(2)
            .render()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE `users` SET `visits` = `visits` + 1, `name` = 'bob' WHERE `id` = 2 ORDER BY `id` DESC LIMIT 2"
        );
    }

    #[test]
    fn no_assignments_is_noop() {
        let t = users();
        assert_eq!(
            Database::new("mysql").update(&t).render().unwrap(),
            "/* UPDATE without SET */ DO 0"
        );
        assert_eq!(
            Database::new("sqlite3").update(&t).render().unwrap(),
            "/* UPDATE without SET */ SELECT 0"
        );
    }

    #[test]
    fn set_if_skips_false_condition() {
        let t = users();
        let base = Database::new("mysql").update(&t).set(t.field("id"), 1);
        let skipped = base.set_if(false, t.field("name"), "x");
        let applied = base.set_if(true, t.field("name"), "x");
        assert_eq!(skipped.render().unwrap(), "UPDATE `users` SET `id` = 1");
        assert_eq!(
            applied.render().unwrap(),
            "UPDATE `users` SET `id` = 1, `name` = 'x'"
        );
    }

    #[test]
    fn constant_where_clauses() {
        let t = users();
        let base = Database::new("mysql").update(&t).set(t.field("id"), 1);
        assert_eq!(
            base.where_(true_()).render().unwrap(),
            "UPDATE `users` SET `id` = 1"
        );
        assert_eq!(
            base.where_(false_()).render().unwrap(),
            "UPDATE `users` SET `id` = 1 WHERE FALSE"
        );
    }

    #[test]
    fn renders_bare_inside_expressions() {
        let t = users();
        let update = Database::new("mysql").update(&t).set(t.field("id"), 1);
        let (sql, _) = Value::from(update).encode(&Scope::default()).unwrap();
        assert_eq!(sql, "UPDATE `users` SET `id` = 1");
    }
}
