//! SQL dialects and quoting rules.
//!
//! A [`Dialect`] is resolved once from a driver name and then selects how
//! identifiers and string literals are quoted at render time.

use crate::error::{SqlError, SqlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Target database family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Generic ANSI quoting.
    #[default]
    Unknown,
    MySql,
    Sqlite3,
    Postgres,
    MsSql,
}

impl Dialect {
    /// Number of dialects; sizes the precomputed quoting tables.
    pub(crate) const COUNT: usize = 5;

    pub(crate) const ALL: [Dialect; Dialect::COUNT] = [
        Dialect::Unknown,
        Dialect::MySql,
        Dialect::Sqlite3,
        Dialect::Postgres,
        Dialect::MsSql,
    ];

    /// Resolve a dialect from a `database/sql`-style driver name.
    ///
    /// Unrecognized names map to [`Dialect::Unknown`].
    pub fn from_driver_name(driver_name: &str) -> Self {
        match driver_name {
            "mysql" => Dialect::MySql,
            "sqlite3" => Dialect::Sqlite3,
            "postgres" => Dialect::Postgres,
            "sqlserver" | "mssql" => Dialect::MsSql,
            _ => Dialect::Unknown,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Quote an identifier.
    ///
    /// Embedded closing quote characters are doubled.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            Dialect::MsSql => format!("[{}]", name.replace(']', "]]")),
            _ => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Quote a string literal.
    ///
    /// Fails for Postgres when `s` contains NUL, which its text types cannot store.
    pub fn quote_string(self, s: &str) -> SqlResult<String> {
        Ok(match self {
            Dialect::Sqlite3 | Dialect::MsSql => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for c in s.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
                out.push('\'');
                out
            }
            Dialect::Postgres => postgres_quote(s)?,
            Dialect::Unknown | Dialect::MySql => backslash_quote(s),
        })
    }

    /// Reverse [`Dialect::quote_string`].
    ///
    /// Returns `None` when `literal` is not a well-formed literal for this dialect.
    pub fn unquote_string(self, literal: &str) -> Option<String> {
        match self {
            Dialect::Sqlite3 | Dialect::MsSql => {
                let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
                let mut out = String::with_capacity(body.len());
                let mut chars = body.chars();
                while let Some(c) = chars.next() {
                    if c == '\'' && chars.next()? != '\'' {
                        return None;
                    }
                    out.push(c);
                }
                Some(out)
            }
            Dialect::Postgres => postgres_unquote(literal),
            Dialect::Unknown | Dialect::MySql => backslash_unquote(literal),
        }
    }

    /// Boolean literal.
    pub fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Postgres, true) => "TRUE",
            (Dialect::Postgres, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    /// Statement that does nothing; used for empty INSERT/UPDATE.
    pub(crate) fn noop_statement(self) -> &'static str {
        match self {
            Dialect::MySql => "DO 0",
            _ => "SELECT 0",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Unknown => "unknown",
            Dialect::MySql => "mysql",
            Dialect::Sqlite3 => "sqlite3",
            Dialect::Postgres => "postgres",
            Dialect::MsSql => "mssql",
        };
        f.write_str(name)
    }
}

fn backslash_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn backslash_unquote(literal: &str) -> Option<String> {
    let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next()? {
            '0' => '\0',
            'n' => '\n',
            'r' => '\r',
            'Z' => '\x1a',
            other => other,
        };
        out.push(unescaped);
    }
    Some(out)
}

/// `E'...'` escape-string form. Only escapes Postgres itself decodes are emitted.
fn postgres_quote(s: &str) -> SqlResult<String> {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("E'");
    for c in s.chars() {
        match c {
            '\0' => {
                return Err(SqlError::invalid_type(
                    "postgres strings cannot contain NUL characters",
                ));
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\x1a' => out.push_str("\\x1a"),
            c => out.push(c),
        }
    }
    out.push('\'');
    Ok(out)
}

/// Decode an `E'...'` literal the way Postgres does: `\b \f \n \r \t`,
/// octal, `\x` hex and `\u`/`\U` escapes; any other escaped character
/// stands for itself. A doubled quote is one quote.
fn postgres_unquote(literal: &str) -> Option<String> {
    let body = literal
        .strip_prefix("E'")
        .or_else(|| literal.strip_prefix("e'"))?
        .strip_suffix('\'')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.next()? != '\'' {
                return None;
            }
            out.push('\'');
            continue;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next()? {
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            d @ '0'..='7' => {
                let mut code = d.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                escaped_char(code)?
            }
            'x' => {
                let mut code = chars.next()?.to_digit(16)?;
                if let Some(digit) = chars.peek().and_then(|c| c.to_digit(16)) {
                    code = code * 16 + digit;
                    chars.next();
                }
                escaped_char(code)?
            }
            'u' => escaped_char(hex_digits(&mut chars, 4)?)?,
            'U' => escaped_char(hex_digits(&mut chars, 8)?)?,
            other => other,
        };
        out.push(unescaped);
    }
    Some(out)
}

fn hex_digits(chars: &mut impl Iterator<Item = char>, count: usize) -> Option<u32> {
    (0..count).try_fold(0u32, |code, _| Some(code * 16 + chars.next()?.to_digit(16)?))
}

/// NUL is not a valid Postgres text character.
fn escaped_char(code: u32) -> Option<char> {
    if code == 0 {
        return None;
    }
    char::from_u32(code)
}

/// An identifier quoted once for every dialect.
#[derive(Debug, Clone)]
pub(crate) struct Quoted([Arc<str>; Dialect::COUNT]);

impl Quoted {
    pub(crate) fn identifier(name: &str) -> Self {
        Quoted(Dialect::ALL.map(|d| Arc::from(d.quote_identifier(name))))
    }

    /// `qualifier.name` in every dialect.
    pub(crate) fn qualified(qualifier: &Quoted, name: &Quoted) -> Self {
        Quoted(Dialect::ALL.map(|d| Arc::from(format!("{}.{}", qualifier.get(d), name.get(d)))))
    }

    pub(crate) fn get(&self, dialect: Dialect) -> &str {
        &self.0[dialect.index()]
    }
}
