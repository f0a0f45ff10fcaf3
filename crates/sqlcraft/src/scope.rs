//! Render-time context.

use crate::dialect::Dialect;
use crate::expression::Expression;
use crate::table::Table;
use std::sync::Arc;

/// Ambient data for one render: dialect, tables in play and the join chain.
///
/// Cloning is cheap; tables and joins are shared.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    dialect: Dialect,
    tables: Arc<[Table]>,
    last_join: Option<Arc<Join>>,
}

impl Scope {
    /// An empty scope for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Arc::from(Vec::new()),
            last_join: None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub(crate) fn with_tables(&self, tables: Vec<Table>) -> Self {
        Self {
            dialect: self.dialect,
            tables: Arc::from(tables),
            last_join: self.last_join.clone(),
        }
    }

    /// Whether any join is active.
    pub fn has_join(&self) -> bool {
        self.last_join.is_some()
    }

    /// Whether a field of `table_name` renders in its `table.field` form.
    pub fn qualifies(&self, table_name: &str) -> bool {
        self.tables.len() != 1 || self.has_join() || self.tables[0].name() != table_name
    }

    pub(crate) fn push_join(&self, kind: JoinKind, table: Table) -> Self {
        let join = Join {
            previous: self.last_join.clone(),
            kind,
            table,
            on: None,
        };
        Self {
            last_join: Some(Arc::new(join)),
            ..self.clone()
        }
    }

    /// Attach `on` to the most recent join.
    pub(crate) fn with_join_condition(&self, on: Expression) -> Self {
        let Some(last) = &self.last_join else {
            return self.clone();
        };
        let join = Join {
            previous: last.previous.clone(),
            kind: last.kind,
            table: last.table.clone(),
            on: Some(on),
        };
        Self {
            last_join: Some(Arc::new(join)),
            ..self.clone()
        }
    }

    /// Joins in the order they were added.
    pub(crate) fn joins(&self) -> Vec<&Join> {
        let mut joins = Vec::new();
        let mut cursor = self.last_join.as_deref();
        while let Some(join) = cursor {
            joins.push(join);
            cursor = join.previous.as_deref();
        }
        joins.reverse();
        joins
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn prefix(self) -> &'static str {
        match self {
            JoinKind::Inner => "",
            JoinKind::Left => "LEFT ",
            JoinKind::Right => "RIGHT ",
        }
    }
}

/// One link of a join chain; each link points at the join added before it.
#[derive(Debug)]
pub(crate) struct Join {
    previous: Option<Arc<Join>>,
    kind: JoinKind,
    table: Table,
    on: Option<Expression>,
}

impl Join {
    /// ` [LEFT |RIGHT ]JOIN <table> ON <condition>`
    pub(crate) fn render(&self, scope: &Scope) -> crate::SqlResult<String> {
        let mut sql = format!(" {}JOIN {}", self.kind.prefix(), self.table.render(scope)?);
        if let Some(on) = &self.on {
            sql.push_str(" ON ");
            sql.push_str(&on.render(scope)?);
        }
        Ok(sql)
    }
}
