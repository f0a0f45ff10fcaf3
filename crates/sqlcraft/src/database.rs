//! Dialect-bound entry point for building statements.

use crate::dialect::Dialect;
use crate::qb::insert_state::Start;
use crate::qb::state::{Fields, Tables};
use crate::qb::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement};
use crate::scope::Scope;
use crate::table::{IntoTables, Table};
use crate::value::IntoValues;

/// Builds statements for one SQL dialect.
///
/// `Database` carries no connection; rendered statements are handed to an
/// [`Executor`](crate::Executor) by their terminal methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Database {
    dialect: Dialect,
}

impl Database {
    /// Resolve the dialect from a driver name (`mysql`, `sqlite3`,
    /// `postgres`, `sqlserver`/`mssql`). Unrecognized names fall back to
    /// [`Dialect::Unknown`].
    pub fn new(driver_name: &str) -> Self {
        Self::with_dialect(Dialect::from_driver_name(driver_name))
    }

    pub const fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn scope(&self) -> Scope {
        Scope::new(self.dialect)
    }

    /// `SELECT fields`. Without a later `from`, the tables are inferred
    /// from the fields.
    pub fn select(&self, fields: impl IntoValues) -> SelectStatement<Fields> {
        SelectStatement::new(self.dialect, false, fields)
    }

    /// `SELECT DISTINCT fields`
    pub fn select_distinct(&self, fields: impl IntoValues) -> SelectStatement<Fields> {
        SelectStatement::new(self.dialect, true, fields)
    }

    /// `SELECT * FROM tables`, or the tables' declared fields.
    pub fn select_from(&self, tables: impl IntoTables) -> SelectStatement<Tables> {
        SelectStatement::new_from(self.dialect, tables)
    }

    pub fn insert_into(&self, table: &Table) -> InsertStatement<Start> {
        InsertStatement::new("INSERT", self.scope(), table.clone())
    }

    pub fn replace_into(&self, table: &Table) -> InsertStatement<Start> {
        InsertStatement::new("REPLACE", self.scope(), table.clone())
    }

    pub fn update(&self, table: &Table) -> UpdateStatement {
        UpdateStatement::new(self.scope(), table.clone())
    }

    pub fn delete_from(&self, table: &Table) -> DeleteStatement {
        DeleteStatement::new(self.scope(), table.clone())
    }
}

impl From<Dialect> for Database {
    fn from(dialect: Dialect) -> Self {
        Self::with_dialect(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names() {
        assert_eq!(Database::new("mysql").dialect(), Dialect::MySql);
        assert_eq!(Database::new("postgres").dialect(), Dialect::Postgres);
        assert_eq!(Database::new("sqlserver").dialect(), Dialect::MsSql);
        assert_eq!(Database::new("oracle").dialect(), Dialect::Unknown);
        assert_eq!(Database::default().dialect(), Dialect::Unknown);
    }

    #[test]
    fn statements_quote_per_dialect() {
        let t = Table::new("t");
        let render = |db: Database| db.select_from(&t).render().unwrap();
        assert_eq!(render(Database::new("mysql")), "SELECT * FROM `t`");
        assert_eq!(render(Database::new("sqlite3")), "SELECT * FROM \"t\"");
        assert_eq!(render(Database::new("mssql")), "SELECT * FROM [t]");
    }
}
