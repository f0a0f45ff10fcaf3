//! INSERT and REPLACE builder.

use crate::assignment::{Assignment, comma_assignments};
use crate::context::ExecContext;
use crate::error::{SqlError, SqlResult};
use crate::expression::Expression;
use crate::model::Model;
use crate::qb::traits::{Mutation, Statement};
use crate::scope::Scope;
use crate::table::Table;
use crate::value::{IntoValues, Value, comma_values};
use std::marker::PhantomData;

/// INSERT builder states.
pub mod insert_state {
    /// Target table chosen; needs fields, values or models.
    #[derive(Debug, Clone, Copy)]
    pub struct Start;
    /// Rows (possibly none) added.
    #[derive(Debug, Clone, Copy)]
    pub struct Rows;
    /// `ON DUPLICATE KEY UPDATE` opened; needs at least one `set`.
    #[derive(Debug, Clone, Copy)]
    pub struct OnDuplicateBegin;
    /// At least one `ON DUPLICATE KEY UPDATE` assignment given.
    #[derive(Debug, Clone, Copy)]
    pub struct OnDuplicate;
    /// Nothing may follow.
    #[derive(Debug, Clone, Copy)]
    pub struct Final;

    pub(crate) mod sealed {
        pub trait Renderable: Send + Sync {}
        impl Renderable for super::Rows {}
        impl Renderable for super::OnDuplicate {}
        impl Renderable for super::Final {}

        pub trait Settable {}
        impl Settable for super::OnDuplicateBegin {}
        impl Settable for super::OnDuplicate {}
    }
}

use insert_state::sealed::{Renderable, Settable};

#[derive(Debug, Clone)]
struct InsertRow {
    /// Table reported by the model the row came from.
    table: Option<Table>,
    values: Vec<Value>,
}

/// `INSERT INTO` / `REPLACE INTO` in state `S`.
///
/// Rows come either from [`InsertStatement::values`] (one call per row) or
/// from [`Model`]s, which supply their own table and values. A statement
/// without rows renders a commented no-op.
#[derive(Debug, Clone)]
pub struct InsertStatement<S> {
    method: &'static str,
    scope: Scope,
    table: Table,
    fields: Vec<Expression>,
    rows: Vec<InsertRow>,
    on_duplicate: Vec<Assignment>,
    ignore_duplicates: bool,
    ctx: ExecContext,
    _state: PhantomData<S>,
}

impl<S> InsertStatement<S> {
    fn to<T>(&self) -> InsertStatement<T> {
        InsertStatement {
            method: self.method,
            scope: self.scope.clone(),
            table: self.table.clone(),
            fields: self.fields.clone(),
            rows: self.rows.clone(),
            on_duplicate: self.on_duplicate.clone(),
            ignore_duplicates: self.ignore_duplicates,
            ctx: self.ctx,
            _state: PhantomData,
        }
    }

    fn push_row(&self, table: Option<Table>, values: Vec<Value>) -> InsertStatement<insert_state::Rows> {
        let mut next = self.to::<insert_state::Rows>();
        next.rows.push(InsertRow { table, values });
        next
    }
}

impl InsertStatement<insert_state::Start> {
    pub(crate) fn new(method: &'static str, scope: Scope, table: Table) -> Self {
        Self {
            method,
            scope: scope.with_tables(vec![table.clone()]),
            table,
            fields: Vec::new(),
            rows: Vec::new(),
            on_duplicate: Vec::new(),
            ignore_duplicates: false,
            ctx: ExecContext::default(),
            _state: PhantomData,
        }
    }

    /// Explicit column list; without it the table's declared fields are used.
    pub fn fields<I>(&self, fields: I) -> InsertStatement<insert_state::Rows>
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        let mut next = self.to::<insert_state::Rows>();
        next.fields = fields.into_iter().map(Into::into).collect();
        next
    }
}

macro_rules! impl_row_methods {
    ($($state:ty),+) => {
        $(impl InsertStatement<$state> {
            /// Add one row of values.
            pub fn values(&self, row: impl IntoValues) -> InsertStatement<insert_state::Rows> {
                self.push_row(None, row.into_values())
            }

            /// Add one row per model. Every model must belong to the target table.
            pub fn models<I>(&self, models: I) -> InsertStatement<insert_state::Rows>
            where
                I: IntoIterator,
                I::Item: Model,
            {
                let mut next = self.to::<insert_state::Rows>();
                next.rows.extend(models.into_iter().map(|model| InsertRow {
                    table: Some(model.table()),
                    values: model.values(),
                }));
                next
            }
        })+
    };
}

impl_row_methods!(insert_state::Start, insert_state::Rows);

impl InsertStatement<insert_state::Rows> {
    /// `ON DUPLICATE KEY UPDATE f = f` on the first inserted field.
    pub fn on_duplicate_key_ignore(&self) -> InsertStatement<insert_state::Final> {
        let mut next = self.to::<insert_state::Final>();
        next.ignore_duplicates = true;
        next
    }

    /// Start an `ON DUPLICATE KEY UPDATE` assignment list.
    pub fn on_duplicate_key_update(&self) -> InsertStatement<insert_state::OnDuplicateBegin> {
        self.to()
    }
}

impl<S: Settable> InsertStatement<S> {
    /// Add `field = value` to the `ON DUPLICATE KEY UPDATE` list.
    pub fn set(
        &self,
        field: impl Into<Expression>,
        value: impl Into<Value>,
    ) -> InsertStatement<insert_state::OnDuplicate> {
        let mut next = self.to::<insert_state::OnDuplicate>();
        next.on_duplicate
            .push(Assignment::new(field.into(), value.into()));
        next
    }

    /// [`InsertStatement::set`] when `condition` holds.
    pub fn set_if(
        &self,
        condition: bool,
        field: impl Into<Expression>,
        value: impl Into<Value>,
    ) -> InsertStatement<insert_state::OnDuplicate> {
        if condition {
            self.set(field, value)
        } else {
            self.to()
        }
    }
}

impl<S: Renderable> InsertStatement<S> {
    /// Attach an execution context used by [`Mutation::execute`].
    pub fn with_context(&self, ctx: ExecContext) -> Self {
        let mut next = self.to::<S>();
        next.ctx = ctx;
        next
    }

    /// Column list: explicit fields, else the first model's table fields,
    /// else the target table's declared fields.
    fn columns(&self) -> Vec<Expression> {
        if !self.fields.is_empty() {
            return self.fields.clone();
        }
        let model_table = self.rows.iter().find_map(|row| row.table.as_ref());
        model_table.unwrap_or(&self.table).fields()
    }

    pub fn render(&self) -> SqlResult<String> {
        let scope = &self.scope;
        if self.rows.is_empty() {
            return Ok(format!(
                "/* {} without VALUES */ {}",
                self.method,
                scope.dialect().noop_statement()
            ));
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if let Some(table) = &row.table
                && table.name() != self.table.name()
            {
                return Err(SqlError::invalid_model(format!(
                    "invalid table from model: expected `{}`, got `{}`",
                    self.table.name(),
                    table.name()
                )));
            }
            rows.push(format!("({})", comma_values(scope, &row.values)?));
        }

        let columns = self.columns();
        let mut sql = String::with_capacity(128);
        sql.push_str(self.method);
        sql.push_str(" INTO ");
        sql.push_str(&self.table.render(scope)?);
        if !columns.is_empty() {
            let rendered = columns
                .iter()
                .map(|c| c.render(scope))
                .collect::<SqlResult<Vec<_>>>()?;
            sql.push_str(" (");
            sql.push_str(&rendered.join(", "));
            sql.push(')');
        }
        sql.push_str(" VALUES ");
        sql.push_str(&rows.join(", "));

        if self.ignore_duplicates {
            let first = columns.into_iter().next().ok_or_else(|| {
                SqlError::invalid_model(format!(
                    "ON DUPLICATE KEY IGNORE needs a field; `{}` declares none",
                    self.table.name()
                ))
            })?;
            let assignment = Assignment::new(first.clone(), first);
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&assignment.render(scope)?);
        } else if !self.on_duplicate.is_empty() {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&comma_assignments(scope, &self.on_duplicate)?);
        }
        Ok(sql)
    }
}

impl<S: Renderable> Statement for InsertStatement<S> {
    fn render(&self) -> SqlResult<String> {
        InsertStatement::render(self)
    }

    fn exec_context(&self) -> &ExecContext {
        &self.ctx
    }
}

impl<S: Renderable> Mutation for InsertStatement<S> {}
