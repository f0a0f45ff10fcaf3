//! Immutable SQL expression nodes.
//!
//! An [`Expression`] is either pre-rendered text or a closure over its
//! children that renders against a [`Scope`]. Operator methods never mutate
//! their receiver; each returns a new node tagged with the operator priority,
//! and parenthesization is decided from the children's priorities at render
//! time.
//!
//! The TRUE and FALSE singletons from [`true_`] and [`false_`] are absorbed by
//! `and`, `or` and `not` at construction time. An operand absorbed this way is
//! never rendered, so an operand that would fail to encode does not surface
//! its error once it has been short-circuited away.

use crate::error::SqlResult;
use crate::order::OrderBy;
use crate::priority::{Priority, parenthesize};
use crate::scope::Scope;
use crate::table::Table;
use crate::value::{IntoValues, Value, comma_values, flatten_values};
use std::fmt;
use std::sync::Arc;

type RenderFn = dyn Fn(&Scope) -> SqlResult<String> + Send + Sync;

#[derive(Clone)]
enum Repr {
    Literal(Arc<str>),
    Computed(Arc<RenderFn>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constant {
    None,
    True,
    False,
}

/// An immutable SQL sub-expression with its operator priority.
#[derive(Clone)]
pub struct Expression {
    repr: Repr,
    priority: Priority,
    constant: Constant,
    source: Option<Table>,
}

/// The TRUE singleton.
pub fn true_() -> Expression {
    Expression::constant("TRUE", Constant::True)
}

/// The FALSE singleton.
pub fn false_() -> Expression {
    Expression::constant("FALSE", Constant::False)
}

/// Pre-rendered SQL text at [`Priority::ATOM`].
pub fn raw(sql: impl Into<String>) -> Expression {
    Expression::raw(sql)
}

/// Wrap any value as an expression, keeping the value's own priority.
pub fn literal(value: impl Into<Value>) -> Expression {
    let value = value.into();
    match value {
        Value::Expr(expr) => expr,
        other => {
            let priority = match &other {
                Value::Assignment(_) => Priority::ASSIGNMENT,
                _ => Priority::ATOM,
            };
            Expression::computed(priority, move |scope| Ok(other.encode(scope)?.0))
        }
    }
}

/// Conjunction of all `conditions`; `TRUE` when empty.
pub fn and<I>(conditions: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    conditions
        .into_iter()
        .fold(true_(), |acc, cond| acc.and(cond.into()))
}

/// Disjunction of all `conditions`; `FALSE` when empty.
pub fn or<I>(conditions: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    conditions
        .into_iter()
        .fold(false_(), |acc, cond| acc.or(cond.into()))
}

/// `NOT condition`
pub fn not(condition: impl Into<Expression>) -> Expression {
    condition.into().not()
}

impl Expression {
    /// Pre-rendered text with a fixed priority.
    pub fn literal(sql: impl Into<String>, priority: Priority) -> Self {
        Self {
            repr: Repr::Literal(Arc::from(sql.into())),
            priority,
            constant: Constant::None,
            source: None,
        }
    }

    /// Pre-rendered text at [`Priority::ATOM`].
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::literal(sql, Priority::ATOM)
    }

    /// A node rendered by `render` each time the expression is rendered.
    ///
    /// `render` must be deterministic; the same scope must yield the same text.
    pub fn computed<F>(priority: Priority, render: F) -> Self
    where
        F: Fn(&Scope) -> SqlResult<String> + Send + Sync + 'static,
    {
        Self {
            repr: Repr::Computed(Arc::new(render)),
            priority,
            constant: Constant::None,
            source: None,
        }
    }

    fn constant(sql: &str, constant: Constant) -> Self {
        Self {
            constant,
            ..Self::raw(sql)
        }
    }

    pub(crate) fn with_source(mut self, table: Table) -> Self {
        self.source = Some(table);
        self
    }

    /// Render against `scope`.
    pub fn render(&self, scope: &Scope) -> SqlResult<String> {
        match &self.repr {
            Repr::Literal(sql) => Ok(sql.to_string()),
            Repr::Computed(render) => render(scope),
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether this is the TRUE singleton.
    pub fn is_true(&self) -> bool {
        self.constant == Constant::True
    }

    /// Whether this is the FALSE singleton.
    pub fn is_false(&self) -> bool {
        self.constant == Constant::False
    }

    /// The table a field reference belongs to.
    pub fn source_table(&self) -> Option<&Table> {
        self.source.as_ref()
    }

    /// `<self> <op> <rhs>`, wrapping the left child when it binds looser than
    /// `op` and the right child when it binds looser or equally.
    fn binary(&self, op: &'static str, priority: Priority, rhs: Value) -> Expression {
        let lhs = self.clone();
        Expression::computed(priority, move |scope| {
            let left = lhs.render(scope)?;
            let (right, right_priority) = rhs.encode(scope)?;
            Ok(format!(
                "{} {op} {}",
                parenthesize(left, lhs.priority.wraps_left_of(priority)),
                parenthesize(right, right_priority.wraps_right_of(priority)),
            ))
        })
    }

    fn prefix_suffix(&self, prefix: &'static str, suffix: &'static str, priority: Priority) -> Self {
        let inner = self.clone();
        Expression::computed(priority, move |scope| {
            let sql = inner.render(scope)?;
            Ok(format!(
                "{prefix}{}{suffix}",
                parenthesize(sql, inner.priority.wraps_left_of(priority))
            ))
        })
    }

    pub fn eq(&self, other: impl Into<Value>) -> Self {
        self.binary("=", Priority::COMPARISON, other.into())
    }

    pub fn ne(&self, other: impl Into<Value>) -> Self {
        self.binary("<>", Priority::COMPARISON, other.into())
    }

    pub fn lt(&self, other: impl Into<Value>) -> Self {
        self.binary("<", Priority::COMPARISON, other.into())
    }

    pub fn le(&self, other: impl Into<Value>) -> Self {
        self.binary("<=", Priority::COMPARISON, other.into())
    }

    pub fn gt(&self, other: impl Into<Value>) -> Self {
        self.binary(">", Priority::COMPARISON, other.into())
    }

    pub fn ge(&self, other: impl Into<Value>) -> Self {
        self.binary(">=", Priority::COMPARISON, other.into())
    }

    /// `self AND other` with TRUE/FALSE absorption.
    pub fn and(&self, other: impl Into<Value>) -> Self {
        let other = other.into();
        if self.is_false() {
            return self.clone();
        }
        if let Value::Expr(rhs) = &other {
            if rhs.is_false() {
                return rhs.clone();
            }
            if rhs.is_true() || self.is_true() {
                return if rhs.is_true() { self.clone() } else { rhs.clone() };
            }
        }
        self.binary("AND", Priority::AND, other)
    }

    /// `self OR other` with TRUE/FALSE absorption.
    pub fn or(&self, other: impl Into<Value>) -> Self {
        let other = other.into();
        if self.is_true() {
            return self.clone();
        }
        if let Value::Expr(rhs) = &other {
            if rhs.is_true() {
                return rhs.clone();
            }
            if rhs.is_false() || self.is_false() {
                return if rhs.is_false() { self.clone() } else { rhs.clone() };
            }
        }
        self.binary("OR", Priority::OR, other)
    }

    pub fn xor(&self, other: impl Into<Value>) -> Self {
        self.binary("XOR", Priority::XOR, other.into())
    }

    /// `NOT self`; `NOT TRUE` is FALSE and `NOT FALSE` is TRUE.
    pub fn not(&self) -> Self {
        match self.constant {
            Constant::True => false_(),
            Constant::False => true_(),
            Constant::None => self.prefix_suffix("NOT ", "", Priority::NOT),
        }
    }

    pub fn add(&self, other: impl Into<Value>) -> Self {
        self.binary("+", Priority::ADDITIVE, other.into())
    }

    pub fn sub(&self, other: impl Into<Value>) -> Self {
        self.binary("-", Priority::ADDITIVE, other.into())
    }

    pub fn mul(&self, other: impl Into<Value>) -> Self {
        self.binary("*", Priority::MULTIPLICATIVE, other.into())
    }

    pub fn div(&self, other: impl Into<Value>) -> Self {
        self.binary("/", Priority::MULTIPLICATIVE, other.into())
    }

    /// Integer division, `DIV`.
    pub fn int_div(&self, other: impl Into<Value>) -> Self {
        self.binary("DIV", Priority::MULTIPLICATIVE, other.into())
    }

    pub fn modulo(&self, other: impl Into<Value>) -> Self {
        self.binary("%", Priority::MULTIPLICATIVE, other.into())
    }

    pub fn like(&self, pattern: impl Into<Value>) -> Self {
        self.binary("LIKE", Priority::COMPARISON, pattern.into())
    }

    pub fn not_like(&self, pattern: impl Into<Value>) -> Self {
        self.binary("NOT LIKE", Priority::COMPARISON, pattern.into())
    }

    /// `CONCAT(self, other)`
    pub fn concat(&self, other: impl Into<Value>) -> Self {
        crate::function::function("CONCAT", (self.clone(), other.into()))
    }

    /// `LOCATE(substring, self) > 0`
    pub fn contains(&self, substring: impl Into<Value>) -> Self {
        crate::function::function("LOCATE", (substring.into(), self.clone())).gt(0)
    }

    pub fn is_null(&self) -> Self {
        self.prefix_suffix("", " IS NULL", Priority::COMPARISON)
    }

    pub fn is_not_null(&self) -> Self {
        self.prefix_suffix("", " IS NOT NULL", Priority::COMPARISON)
    }

    /// `self IN (...)`.
    ///
    /// No operands is FALSE. A single scalar operand becomes `=`. A single
    /// collection operand is expanded in place, and a single sub-SELECT
    /// becomes an `IN` subquery.
    pub fn in_(&self, values: impl IntoValues) -> Self {
        self.membership(values.into_values(), "IN", "=", false_)
    }

    /// `self NOT IN (...)`; no operands is TRUE, a single scalar becomes `<>`.
    pub fn not_in(&self, values: impl IntoValues) -> Self {
        self.membership(values.into_values(), "NOT IN", "<>", true_)
    }

    fn membership(
        &self,
        values: Vec<Value>,
        op: &'static str,
        single_op: &'static str,
        empty: fn() -> Expression,
    ) -> Self {
        let mut values = flatten_values(values);
        match values.len() {
            0 => empty(),
            1 => match values.pop() {
                Some(select @ Value::Select(_)) => self.binary(op, Priority::COMPARISON, select),
                Some(value) => self.binary(single_op, Priority::COMPARISON, value),
                None => empty(),
            },
            _ => {
                let lhs = self.clone();
                Expression::computed(Priority::COMPARISON, move |scope| {
                    let left = lhs.render(scope)?;
                    Ok(format!(
                        "{} {op} ({})",
                        parenthesize(left, lhs.priority.wraps_left_of(Priority::COMPARISON)),
                        comma_values(scope, &values)?
                    ))
                })
            }
        }
    }

    /// `self BETWEEN min AND max`
    pub fn between(&self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.range("BETWEEN", min.into(), max.into())
    }

    /// `self NOT BETWEEN min AND max`
    pub fn not_between(&self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.range("NOT BETWEEN", min.into(), max.into())
    }

    fn range(&self, op: &'static str, min: Value, max: Value) -> Self {
        let lhs = self.clone();
        let priority = Priority::BETWEEN;
        Expression::computed(priority, move |scope| {
            let left = lhs.render(scope)?;
            let (min_sql, min_priority) = min.encode(scope)?;
            let (max_sql, max_priority) = max.encode(scope)?;
            Ok(format!(
                "{} {op} {} AND {}",
                parenthesize(left, lhs.priority.wraps_left_of(priority)),
                parenthesize(min_sql, min_priority.wraps_right_of(priority)),
                parenthesize(max_sql, max_priority.wraps_right_of(priority)),
            ))
        })
    }

    /// `self AS name`, with `name` quoted for the dialect.
    pub fn as_(&self, name: &str) -> Self {
        let inner = self.clone();
        let quoted = crate::dialect::Quoted::identifier(name);
        let mut aliased = Expression::computed(Priority::ATOM, move |scope| {
            Ok(format!(
                "{} AS {}",
                inner.render(scope)?,
                quoted.get(scope.dialect())
            ))
        });
        aliased.source = self.source.clone();
        aliased
    }

    /// `IFNULL(self, alternative)`
    pub fn if_null(&self, alternative: impl Into<Value>) -> Self {
        crate::function::function("IFNULL", (self.clone(), alternative.into()))
    }

    /// `ST_AsText(self)`
    pub fn st_as_text(&self) -> Self {
        crate::function::function("ST_AsText", (self.clone(),))
    }

    pub fn sum(&self) -> Self {
        crate::function::sum(self)
    }

    pub fn avg(&self) -> Self {
        crate::function::avg(self)
    }

    pub fn min(&self) -> Self {
        crate::function::min(self)
    }

    pub fn max(&self) -> Self {
        crate::function::max(self)
    }

    pub fn count(&self) -> Self {
        crate::function::count(self)
    }

    /// Ascending ORDER BY item.
    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.clone(), false)
    }

    /// Descending ORDER BY item.
    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.clone(), true)
    }

    /// `field = value`, for UPDATE SET and ON DUPLICATE KEY UPDATE.
    pub fn assign(&self, value: impl Into<Value>) -> crate::assignment::Assignment {
        crate::assignment::Assignment::new(self.clone(), value)
    }
}

impl From<&Expression> for Expression {
    fn from(e: &Expression) -> Self {
        e.clone()
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Expression");
        match &self.repr {
            Repr::Literal(sql) => d.field("sql", sql),
            Repr::Computed(_) => d.field("sql", &"<computed>"),
        };
        d.field("priority", &self.priority);
        if self.constant != Constant::None {
            d.field("constant", &self.constant);
        }
        d.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::SqlError;

    fn render(e: &Expression) -> String {
        e.render(&Scope::new(Dialect::MySql)).unwrap()
    }

    fn leaf(name: &str, level: u8) -> Expression {
        Expression::literal(name, Priority::new(level))
    }

    fn failing() -> Expression {
        Expression::computed(Priority::ATOM, |_| Err(SqlError::invalid_type("unsupported")))
    }

    #[test]
    fn right_operand_wraps_on_tie() {
        let e7 = leaf("e7", 7);
        assert_eq!(render(&e7.add(&e7)), "e7 + (e7)");
    }

    #[test]
    fn subtraction_stays_left_associative() {
        let a = raw("a");
        assert_eq!(render(&a.sub(raw("b")).sub(raw("c"))), "a - b - c");
        assert_eq!(render(&a.sub(raw("b").sub(raw("c")))), "a - (b - c)");
    }

    #[test]
    fn mixed_and_or_chain() {
        let (a, b, c) = (leaf("a", 1), leaf("b", 1), leaf("c", 1));
        let e = a.and(&b).or(&c).and(&a).or(&b).and(&c);
        assert_eq!(render(&e), "((a AND b OR c) AND a OR b) AND c");
    }

    #[test]
    fn arithmetic_precedence() {
        let a = raw("a");
        assert_eq!(render(&a.add(1).mul(2)), "(a + 1) * 2");
        assert_eq!(render(&a.mul(2).add(1)), "a * 2 + 1");
        assert_eq!(render(&a.int_div(3).modulo(2)), "a DIV 3 % 2");
        assert_eq!(render(&a.div(raw("b").mul(2))), "a / (b * 2)");
    }

    #[test]
    fn comparisons() {
        let a = raw("a");
        assert_eq!(render(&a.eq(1)), "a = 1");
        assert_eq!(render(&a.ne("x")), "a <> 'x'");
        assert_eq!(render(&a.lt(1).and(a.ge(0))), "a < 1 AND a >= 0");
        assert_eq!(render(&a.le(1).or(a.gt(9))), "a <= 1 OR a > 9");
        assert_eq!(render(&a.like("%x%")), "a LIKE '%x%'");
        assert_eq!(render(&a.not_like("x%")), "a NOT LIKE 'x%'");
        assert_eq!(render(&a.xor(raw("b"))), "a XOR b");
    }

    #[test]
    fn null_checks_and_not() {
        let a = raw("a");
        assert_eq!(render(&a.is_null()), "a IS NULL");
        assert_eq!(render(&a.add(1).is_not_null()), "a + 1 IS NOT NULL");
        assert_eq!(render(&a.and(raw("b")).is_null()), "(a AND b) IS NULL");
        assert_eq!(render(&a.eq(1).not()), "NOT a = 1");
        assert_eq!(render(&a.and(raw("b")).not()), "NOT (a AND b)");
        assert_eq!(render(&not(a.eq(1).or(a.eq(2)))), "NOT (a = 1 OR a = 2)");
    }

    #[test]
    fn variadic_identities() {
        assert_eq!(render(&and(Vec::<Expression>::new())), "TRUE");
        assert_eq!(render(&or(Vec::<Expression>::new())), "FALSE");
        assert!(and(Vec::<Expression>::new()).is_true());
        assert!(or(Vec::<Expression>::new()).is_false());
    }

    #[test]
    fn variadic_folds_through_optimizer() {
        let a = raw("a");
        let b = raw("b");
        assert_eq!(render(&and([a.clone()])), "a");
        assert_eq!(render(&and([a.clone(), b.clone()])), "a AND b");
        assert_eq!(render(&or([a.clone(), b.clone(), raw("c")])), "a OR b OR c");
        assert!(and([a.clone(), false_()]).is_false());
        assert!(or([a, true_(), b]).is_true());
    }

    #[test]
    fn true_and_expression_substitutes() {
        let x = raw("x").eq(1);
        assert_eq!(render(&true_().and(&x)), "x = 1");
        assert!(true_().and(true_()).is_true());
        assert!(true_().and(false_()).is_false());
    }

    #[test]
    fn true_and_scalar_renders_literally() {
        assert_eq!(render(&true_().and(1)), "TRUE AND 1");
        assert_eq!(render(&false_().or("y")), "FALSE OR 'y'");
    }

    #[test]
    fn false_and_anything_is_false() {
        assert!(false_().and(raw("x")).is_false());
        assert!(raw("x").and(false_()).is_false());
        assert!(true_().or(raw("x")).is_true());
        assert!(raw("x").or(true_()).is_true());
        assert_eq!(render(&false_().or(raw("x"))), "x");
        assert_eq!(render(&raw("x").and(true_())), "x");
    }

    // Absorption happens before rendering, so an operand that would fail to
    // encode is dropped along with its error. This is intentional.
    #[test]
    fn absorbed_operand_errors_are_masked() {
        let masked = false_().and(failing());
        assert_eq!(render(&masked), "FALSE");
        let masked = true_().or(failing());
        assert_eq!(render(&masked), "TRUE");

        let surfaced = raw("a").and(failing());
        assert!(surfaced.render(&Scope::default()).is_err());
    }

    #[test]
    fn not_of_constants() {
        assert!(true_().not().is_false());
        assert!(false_().not().is_true());
        assert!(!raw("a").is_true() && !raw("a").is_false());
    }

    #[test]
    fn in_collapsing() {
        let e = raw("e");
        assert_eq!(render(&e.in_(())), "FALSE");
        assert!(e.in_(Vec::<i32>::new()).is_false());
        assert_eq!(render(&e.in_([1])), "e = 1");
        assert_eq!(render(&e.in_([1, 2, 3])), "e IN (1, 2, 3)");
        assert_eq!(render(&e.in_([vec![1, 2, 3]])), "e IN (1, 2, 3)");
        assert_eq!(render(&e.in_(vec![1, 2, 3])), "e IN (1, 2, 3)");
        assert_eq!(render(&e.in_([vec![7]])), "e = 7");
    }

    #[test]
    fn in_splices_nested_collections() {
        let e = raw("e");
        assert_eq!(render(&e.in_((1, vec![2, 3]))), "e IN (1, 2, 3)");
        assert_eq!(render(&e.not_in((vec![1], Vec::<i32>::new()))), "e <> 1");
        assert!(e.in_((Vec::<i32>::new(), Vec::<i32>::new())).is_false());
    }

    #[test]
    fn not_in_collapsing() {
        let e = raw("e");
        assert!(e.not_in(()).is_true());
        assert_eq!(render(&e.not_in(("x",))), "e <> 'x'");
        assert_eq!(render(&e.not_in((1, "x"))), "e NOT IN (1, 'x')");
    }

    #[test]
    fn in_wraps_loose_left_operand() {
        let e = raw("a").add(1).and(raw("b"));
        assert_eq!(render(&e.in_([1, 2])), "(a + 1 AND b) IN (1, 2)");
    }

    #[test]
    fn between_encodes_bounds() {
        let a = raw("a");
        assert_eq!(render(&a.between(1, 10)), "a BETWEEN 1 AND 10");
        assert_eq!(
            render(&a.not_between(raw("b").add(1), raw("c").eq(2))),
            "a NOT BETWEEN b + 1 AND c = 2"
        );
        assert_eq!(
            render(&a.between(0, raw("x").and(raw("y")))),
            "a BETWEEN 0 AND (x AND y)"
        );
        assert!(a.between(f64::NAN, 1).render(&Scope::default()).is_err());
        assert!(a.between(1, failing()).render(&Scope::default()).is_err());
    }

    #[test]
    fn text_helpers() {
        let a = raw("a");
        assert_eq!(render(&a.concat("x")), "CONCAT(a, 'x')");
        assert_eq!(render(&a.contains("x")), "LOCATE('x', a) > 0");
        assert_eq!(render(&a.if_null(3)), "IFNULL(a, 3)");
        assert_eq!(render(&a.add(1).as_("total")), "a + 1 AS `total`");
    }

    #[test]
    fn rerender_is_idempotent() {
        let e = raw("a").add(1).mul(2).in_([1, 2]);
        let scope = Scope::new(Dialect::MySql);
        assert_eq!(e.render(&scope).unwrap(), e.render(&scope).unwrap());
    }

    #[test]
    fn literal_wraps_values() {
        assert_eq!(render(&literal("x")), "'x'");
        assert_eq!(render(&literal(vec![1, 2])), "(1, 2)");
        let e = raw("a");
        assert_eq!(literal(&e).priority(), Priority::ATOM);
    }
}
