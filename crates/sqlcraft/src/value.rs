//! Values accepted wherever SQL operands are expected, and their encoding.
//!
//! [`Value`] is a closed set of shapes. Anything convertible with `Into<Value>`
//! can be compared against, inserted, assigned or passed to a function.

use crate::assignment::Assignment;
use crate::error::{SqlError, SqlResult};
use crate::expression::Expression;
use crate::priority::Priority;
use crate::qb::{SelectCore, UpdateStatement};
use crate::scope::Scope;
use crate::table::Table;
use std::sync::Arc;

/// Maximum nesting of lists inside lists before encoding gives up.
pub const MAX_LIST_DEPTH: usize = 16;

/// An operand: scalar, collection, expression or sub-statement.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// Rendered as a parenthesized, comma-separated list; nested lists are flattened.
    List(Vec<Value>),
    Expr(Expression),
    Assignment(Box<Assignment>),
    /// Rendered in parentheses.
    Select(Arc<SelectCore>),
    /// Rendered bare.
    Update(Arc<UpdateStatement>),
    Table(Table),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render this value for `scope`, returning the SQL text and its priority.
    pub fn encode(&self, scope: &Scope) -> SqlResult<(String, Priority)> {
        match self {
            Value::Null => Ok(("NULL".to_string(), Priority::ATOM)),
            Value::Bool(b) => Ok((scope.dialect().bool_literal(*b).to_string(), Priority::ATOM)),
            Value::Int(i) => Ok((i.to_string(), Priority::ATOM)),
            Value::UInt(u) => Ok((u.to_string(), Priority::ATOM)),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(SqlError::invalid_type(format!(
                        "float {f} has no SQL representation"
                    )));
                }
                Ok((f.to_string(), Priority::ATOM))
            }
            Value::String(s) => Ok((scope.dialect().quote_string(s)?, Priority::ATOM)),
            Value::List(items) => {
                let mut flat = Vec::with_capacity(items.len());
                flatten_into(items, 0, &mut flat)?;
                Ok((format!("({})", comma_values(scope, flat)?), Priority::ATOM))
            }
            Value::Expr(expr) => Ok((expr.render(scope)?, expr.priority())),
            Value::Assignment(assignment) => {
                Ok((assignment.render(scope)?, Priority::ASSIGNMENT))
            }
            Value::Select(select) => Ok((format!("({})", select.render()?), Priority::ATOM)),
            Value::Update(update) => Ok((update.render()?, Priority::ATOM)),
            Value::Table(table) => Ok((table.render(scope)?, Priority::ATOM)),
        }
    }
}

fn flatten_into<'a>(items: &'a [Value], depth: usize, out: &mut Vec<&'a Value>) -> SqlResult<()> {
    if depth >= MAX_LIST_DEPTH {
        return Err(SqlError::invalid_type(format!(
            "collections nested deeper than {MAX_LIST_DEPTH} levels"
        )));
    }
    for item in items {
        match item {
            Value::List(nested) => flatten_into(nested, depth + 1, out)?,
            other => out.push(other),
        }
    }
    Ok(())
}

/// Splice nested collections into one operand list.
///
/// Lists nested past the depth limit are kept as they are, so encoding them
/// reports the error.
pub(crate) fn flatten_values(values: Vec<Value>) -> Vec<Value> {
    fn splice(values: Vec<Value>, depth: usize, out: &mut Vec<Value>) {
        for value in values {
            match value {
                Value::List(nested) if depth < MAX_LIST_DEPTH => splice(nested, depth + 1, out),
                other => out.push(other),
            }
        }
    }
    let mut out = Vec::with_capacity(values.len());
    splice(values, 0, &mut out);
    out
}

/// Encode each value and join with `", "`.
pub(crate) fn comma_values<'a>(
    scope: &Scope,
    values: impl IntoIterator<Item = &'a Value>,
) -> SqlResult<String> {
    let rendered = values
        .into_iter()
        .map(|v| v.encode(scope).map(|(sql, _)| sql))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Box<T>> for Value {
    fn from(v: Box<T>) -> Self {
        (*v).into()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl From<Expression> for Value {
    fn from(v: Expression) -> Self {
        Value::Expr(v)
    }
}

impl From<&Expression> for Value {
    fn from(v: &Expression) -> Self {
        Value::Expr(v.clone())
    }
}

impl From<Assignment> for Value {
    fn from(v: Assignment) -> Self {
        Value::Assignment(Box::new(v))
    }
}

impl From<Table> for Value {
    fn from(v: Table) -> Self {
        Value::Table(v)
    }
}

impl From<&Table> for Value {
    fn from(v: &Table) -> Self {
        Value::Table(v.clone())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::String(v.to_string())
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::String(v.format("%Y-%m-%d").to_string())
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::String(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Value {
    fn from(v: chrono::DateTime<Tz>) -> Self {
        v.naive_utc().into()
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            other => Value::String(other.to_string()),
        }
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Expr(Expression::raw(v.to_string()))
    }
}

/// Conversion into an ordered list of values, used by variadic builder methods.
///
/// Implemented for arrays, vectors and tuples of mixed `Into<Value>` types,
/// so `(field, 123, "x")` and `[a, b, c]` both work.
pub trait IntoValues {
    fn into_values(self) -> Vec<Value>;
}

impl IntoValues for () {
    fn into_values(self) -> Vec<Value> {
        Vec::new()
    }
}

impl<T: Into<Value>> IntoValues for Vec<T> {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_values_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoValues for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_values_tuple!(A);
impl_into_values_tuple!(A, B);
impl_into_values_tuple!(A, B, C);
impl_into_values_tuple!(A, B, C, D);
impl_into_values_tuple!(A, B, C, D, E);
impl_into_values_tuple!(A, B, C, D, E, F);
impl_into_values_tuple!(A, B, C, D, E, F, G);
impl_into_values_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    fn enc(v: impl Into<Value>) -> String {
        v.into().encode(&Scope::new(Dialect::MySql)).unwrap().0
    }

    #[test]
    fn scalars() {
        assert_eq!(enc(42), "42");
        assert_eq!(enc(-7i64), "-7");
        assert_eq!(enc(u64::MAX), "18446744073709551615");
        assert_eq!(enc(1.5), "1.5");
        assert_eq!(enc(2.0), "2");
        assert_eq!(enc(true), "1");
        assert_eq!(enc(false), "0");
        assert_eq!(enc("abc"), "'abc'");
    }

    #[test]
    fn postgres_booleans() {
        let scope = Scope::new(Dialect::Postgres);
        assert_eq!(Value::from(true).encode(&scope).unwrap().0, "TRUE");
    }

    #[test]
    fn postgres_rejects_nul_in_strings() {
        let scope = Scope::new(Dialect::Postgres);
        let err = Value::from("a\0b").encode(&scope).unwrap_err();
        assert!(err.is_invalid_type());
        assert_eq!(enc("a\0b"), "'a\\0b'");
    }

    #[test]
    fn nulls_and_options() {
        assert_eq!(enc(Option::<i32>::None), "NULL");
        assert_eq!(enc(Some(Some(3))), "3");
        assert_eq!(enc(Some(Option::<&str>::None)), "NULL");
        assert_eq!(enc(Box::new(5)), "5");
    }

    #[test]
    fn lists_flatten() {
        assert_eq!(enc(vec![1, 2, 3]), "(1, 2, 3)");
        assert_eq!(enc(vec![vec![1, 2], vec![3]]), "(1, 2, 3)");
        assert_eq!(enc(vec![Some(1), None]), "(1, NULL)");
        assert_eq!(enc(&[1u8, 2][..]), "(1, 2)");
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut v = Value::from(1);
        for _ in 0..=MAX_LIST_DEPTH {
            v = Value::List(vec![v]);
        }
        let err = v.encode(&Scope::new(Dialect::MySql)).unwrap_err();
        assert!(err.is_invalid_type());
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let scope = Scope::new(Dialect::MySql);
        assert!(Value::from(f64::NAN).encode(&scope).is_err());
        assert!(Value::from(f64::INFINITY).encode(&scope).is_err());
    }

    #[test]
    fn expressions_keep_priority() {
        let e = Expression::literal("a + b", Priority::ADDITIVE);
        let (sql, p) = Value::from(e).encode(&Scope::default()).unwrap();
        assert_eq!(sql, "a + b");
        assert_eq!(p, Priority::ADDITIVE);
    }

    #[test]
    fn tuples_mix_types() {
        let values = (1, "x", None::<i32>).into_values();
        assert_eq!(values.len(), 3);
        assert!(values[2].is_null());
    }

    #[test]
    fn external_types_render_as_strings() {
        let id = uuid::Uuid::nil();
        assert_eq!(enc(id), "'00000000-0000-0000-0000-000000000000'");
        let day = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(enc(day), "'2024-02-29'");
        assert_eq!(enc(serde_json::json!({"a": 1})), "'{\\\"a\\\":1}'");
    }
}
