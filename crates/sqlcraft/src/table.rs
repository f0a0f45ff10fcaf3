//! Table references and field declarations.

use crate::dialect::Quoted;
use crate::error::SqlResult;
use crate::expression::Expression;
use crate::priority::Priority;
use crate::qb::SelectCore;
use crate::scope::Scope;
use std::fmt;
use std::sync::Arc;

/// A table that can appear in FROM, JOIN, INSERT, UPDATE or DELETE.
///
/// Either a named table, optionally declaring its fields, or a derived table
/// wrapping a sub-SELECT under an alias.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

enum TableInner {
    Named {
        name: Arc<str>,
        quoted: Quoted,
        fields: Vec<Arc<str>>,
    },
    Derived {
        alias: Arc<str>,
        quoted: Quoted,
        select: SelectCore,
    },
}

impl Table {
    /// A table with no declared fields.
    pub fn new(name: &str) -> Self {
        Self::with_fields(name, &[])
    }

    /// A table declaring its fields in column order.
    pub fn with_fields(name: &str, fields: &[&str]) -> Self {
        Self {
            inner: Arc::new(TableInner::Named {
                name: Arc::from(name),
                quoted: Quoted::identifier(name),
                fields: fields.iter().map(|f| Arc::from(*f)).collect(),
            }),
        }
    }

    pub(crate) fn derived(alias: &str, select: SelectCore) -> Self {
        Self {
            inner: Arc::new(TableInner::Derived {
                alias: Arc::from(alias),
                quoted: Quoted::identifier(alias),
                select,
            }),
        }
    }

    /// Table name, or the alias of a derived table.
    pub fn name(&self) -> &str {
        match &*self.inner {
            TableInner::Named { name, .. } => name,
            TableInner::Derived { alias, .. } => alias,
        }
    }

    fn name_arc(&self) -> Arc<str> {
        match &*self.inner {
            TableInner::Named { name, .. } => name.clone(),
            TableInner::Derived { alias, .. } => alias.clone(),
        }
    }

    fn quoted(&self) -> &Quoted {
        match &*self.inner {
            TableInner::Named { quoted, .. } | TableInner::Derived { quoted, .. } => quoted,
        }
    }

    /// Declared field names; empty for derived tables.
    pub fn field_names(&self) -> Vec<&str> {
        match &*self.inner {
            TableInner::Named { fields, .. } => fields.iter().map(|f| &**f).collect(),
            TableInner::Derived { .. } => Vec::new(),
        }
    }

    /// Reference a field of this table.
    ///
    /// Renders as `field` when this is the only table in play and nothing is
    /// joined, `table.field` otherwise.
    pub fn field(&self, name: &str) -> Expression {
        let short = Quoted::identifier(name);
        let full = Quoted::qualified(self.quoted(), &short);
        let table_name = self.name_arc();
        Expression::computed(Priority::ATOM, move |scope| {
            let form = if scope.qualifies(&table_name) {
                &full
            } else {
                &short
            };
            Ok(form.get(scope.dialect()).to_string())
        })
        .with_source(self.clone())
    }

    /// All declared fields as expressions.
    pub fn fields(&self) -> Vec<Expression> {
        self.field_names()
            .into_iter()
            .map(|name| self.field(name))
            .collect()
    }

    /// `*`, or `table.*` when the table must be qualified.
    pub(crate) fn all_columns(&self) -> Expression {
        let table_name = self.name_arc();
        Expression::computed(Priority::ATOM, move |scope| {
            Ok(if scope.qualifies(&table_name) {
                format!("{}.*", scope.dialect().quote_identifier(&table_name))
            } else {
                "*".to_string()
            })
        })
        .with_source(self.clone())
    }

    /// FROM-clause form.
    pub fn render(&self, scope: &Scope) -> SqlResult<String> {
        match &*self.inner {
            TableInner::Named { quoted, .. } => Ok(quoted.get(scope.dialect()).to_string()),
            TableInner::Derived { alias, select, .. } => {
                Ok(format!("({}) AS {alias}", select.render()?))
            }
        }
    }

    /// Field list used by `SELECT` without explicit fields.
    pub(crate) fn fields_sql(&self, scope: &Scope) -> SqlResult<String> {
        let fields = self.fields();
        if fields.is_empty() {
            return self.all_columns().render(scope);
        }
        let rendered = fields
            .iter()
            .map(|f| f.render(scope))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.name() == other.name()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            TableInner::Named { name, fields, .. } => f
                .debug_struct("Table")
                .field("name", name)
                .field("fields", fields)
                .finish(),
            TableInner::Derived { alias, .. } => {
                f.debug_struct("DerivedTable").field("alias", alias).finish()
            }
        }
    }
}

impl From<&Table> for Table {
    fn from(table: &Table) -> Self {
        table.clone()
    }
}

/// One or more tables for a FROM clause.
pub trait IntoTables {
    fn into_tables(self) -> Vec<Table>;
}

impl IntoTables for Table {
    fn into_tables(self) -> Vec<Table> {
        vec![self]
    }
}

impl IntoTables for &Table {
    fn into_tables(self) -> Vec<Table> {
        vec![self.clone()]
    }
}

impl<T: Into<Table>> IntoTables for Vec<T> {
    fn into_tables(self) -> Vec<Table> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Table>, const N: usize> IntoTables for [T; N] {
    fn into_tables(self) -> Vec<Table> {
        self.into_iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn field_forms_follow_scope() {
        let users = Table::with_fields("users", &["id", "name"]);
        let id = users.field("id");

        let single = Scope::new(Dialect::MySql).with_tables(vec![users.clone()]);
        assert_eq!(id.render(&single).unwrap(), "`id`");

        let other = Scope::new(Dialect::MySql).with_tables(vec![Table::new("orders")]);
        assert_eq!(id.render(&other).unwrap(), "`users`.`id`");

        let none = Scope::new(Dialect::Postgres);
        assert_eq!(id.render(&none).unwrap(), "\"users\".\"id\"");
    }

    #[test]
    fn declared_fields_sql() {
        let users = Table::with_fields("users", &["id", "name"]);
        let single = Scope::new(Dialect::MySql).with_tables(vec![users.clone()]);
        assert_eq!(users.fields_sql(&single).unwrap(), "`id`, `name`");

        let both = single.with_tables(vec![users.clone(), Table::new("t2")]);
        assert_eq!(
            users.fields_sql(&both).unwrap(),
            "`users`.`id`, `users`.`name`"
        );
        assert_eq!(Table::new("t2").fields_sql(&both).unwrap(), "`t2`.*");

        let bare = Table::new("t2");
        let alone = Scope::new(Dialect::MySql).with_tables(vec![bare.clone()]);
        assert_eq!(bare.fields_sql(&alone).unwrap(), "*");
    }

    #[test]
    fn into_tables_accepts_refs_and_arrays() {
        let a = Table::new("a");
        let b = Table::new("b");
        let names: Vec<String> = [&a, &b]
            .into_tables()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!((&a).into_tables(), vec![a.clone()]);
    }

    #[test]
    fn field_remembers_its_table() {
        let users = Table::new("users");
        let id = users.field("id");
        assert_eq!(id.source_table(), Some(&users));
    }
}
