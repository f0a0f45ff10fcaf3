//! DELETE builder.

use crate::context::ExecContext;
use crate::error::SqlResult;
use crate::expression::Expression;
use crate::order::{OrderBy, comma_order_bys};
use crate::qb::traits::{Mutation, Statement};
use crate::qb::{append_limit, append_where};
use crate::scope::Scope;
use crate::table::Table;

/// `DELETE FROM table [WHERE ...] [ORDER BY ...] [LIMIT n]`
///
/// A FALSE condition is rendered as `WHERE FALSE`, so a statement filtered
/// down to nothing deletes nothing.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    scope: Scope,
    table: Table,
    where_: Option<Expression>,
    order_bys: Vec<OrderBy>,
    limit: Option<u64>,
    ctx: ExecContext,
}

impl DeleteStatement {
    pub(crate) fn new(scope: Scope, table: Table) -> Self {
        Self {
            scope: scope.with_tables(vec![table.clone()]),
            table,
            where_: None,
            order_bys: Vec::new(),
            limit: None,
            ctx: ExecContext::default(),
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
        let mut sql = String::with_capacity(128);
        sql.push_str("DELETE FROM ");
        sql.push_str(&self.table.render(scope)?);

        append_where(&mut sql, scope, self.where_.as_ref())?;

        if !self.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&comma_order_bys(scope, &self.order_bys)?);
        }
        append_limit(&mut sql, self.limit);
        Ok(sql)
    }
}

impl Statement for DeleteStatement {
    fn render(&self) -> SqlResult<String> {
        DeleteStatement::render(self)
    }

    fn exec_context(&self) -> &ExecContext {
        &self.ctx
    }
}

impl Mutation for DeleteStatement {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::expression::{false_, raw};

    #[test]
    fn where_order_limit() {
        let t = Table::new("table1");
        let db = Database::new("mysql");
        assert_eq!(
            db.delete_from(&t).where_(raw("##")).render().unwrap(),
            "DELETE FROM `table1` WHERE ##"
        );
        assert_eq!(
            db.delete_from(&t)
                .where_(raw("#1#"))
                .order_by([raw("#2#")])
                .limit(3)
                .render()
                .unwrap(),
            "DELETE FROM `table1` WHERE #1# ORDER BY #2# LIMIT 3"
        );
    }

    #[test]
    fn false_condition_is_explicit() {
        let t = Table::new("table1");
        assert_eq!(
            Database::new("mysql")
                .delete_from(&t)
                .where_(false_())
                .render()
                .unwrap(),
            "DELETE FROM `table1` WHERE FALSE"
        );
    }

    #[test]
    fn without_where() {
        let t = Table::new("logs");
        assert_eq!(
            Database::new("postgres").delete_from(&t).render().unwrap(),
            "DELETE FROM \"logs\""
        );
    }
}
