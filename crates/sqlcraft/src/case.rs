//! `CASE WHEN ... THEN ... ELSE ... END`

use crate::expression::Expression;
use crate::priority::Priority;
use crate::value::Value;

/// Start a CASE expression.
pub fn case() -> Case {
    Case::default()
}

/// CASE builder; `when_then` may be chained before `else_` and `end`.
#[derive(Debug, Clone, Default)]
pub struct Case {
    branches: Vec<(Expression, Value)>,
    otherwise: Option<Value>,
}

impl Case {
    pub fn when_then(&self, when: impl Into<Expression>, then: impl Into<Value>) -> Case {
        let mut next = self.clone();
        next.branches.push((when.into(), then.into()));
        next
    }

    pub fn else_(&self, value: impl Into<Value>) -> Case {
        Case {
            branches: self.branches.clone(),
            otherwise: Some(value.into()),
        }
    }

    /// Finish the CASE.
    ///
    /// Without any WHEN branch the result is just the ELSE value (or `NULL`).
    pub fn end(&self) -> Expression {
        let otherwise = self.otherwise.clone();
        if self.branches.is_empty() {
            let value = otherwise.unwrap_or(Value::Null);
            return Expression::computed(Priority::ATOM, move |scope| Ok(value.encode(scope)?.0));
        }

        let branches = self.branches.clone();
        Expression::computed(Priority::BETWEEN, move |scope| {
            let mut sql = String::from("CASE ");
            for (when, then) in &branches {
                sql.push_str("WHEN ");
                sql.push_str(&when.render(scope)?);
                sql.push_str(" THEN ");
                sql.push_str(&then.encode(scope)?.0);
                sql.push(' ');
            }
            if let Some(value) = &otherwise {
                sql.push_str("ELSE ");
                sql.push_str(&value.encode(scope)?.0);
                sql.push(' ');
            }
            sql.push_str("END");
            Ok(sql)
        })
    }
}

impl From<Case> for Value {
    fn from(case: Case) -> Self {
        Value::Expr(case.end())
    }
}

impl From<Case> for Expression {
    fn from(case: Case) -> Self {
        case.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::raw;
    use crate::scope::Scope;

    fn render(e: &Expression) -> String {
        e.render(&Scope::default()).unwrap()
    }

    #[test]
    fn branches_and_else() {
        let e = case()
            .when_then(raw("c1"), 1)
            .when_then(raw("c2"), 2)
            .else_(0)
            .end();
        assert_eq!(render(&e), "CASE WHEN c1 THEN 1 WHEN c2 THEN 2 ELSE 0 END");
    }

    #[test]
    fn without_else() {
        let e = case().when_then(raw("c"), "x").end();
        assert_eq!(render(&e), "CASE WHEN c THEN 'x' END");
    }

    #[test]
    fn only_else_renders_the_value() {
        assert_eq!(render(&case().else_(3).end()), "3");
        assert_eq!(render(&case().end()), "NULL");
    }

    #[test]
    fn builder_does_not_leak_between_branches() {
        let base = case().when_then(raw("a"), 1);
        let left = base.when_then(raw("b"), 2).end();
        let right = base.else_(9).end();
        assert_eq!(render(&left), "CASE WHEN a THEN 1 WHEN b THEN 2 END");
        assert_eq!(render(&right), "CASE WHEN a THEN 1 ELSE 9 END");
    }

    #[test]
    fn case_as_operand() {
        let e = raw("x").add(case().when_then(raw("c"), 1).else_(0));
        assert_eq!(render(&e), "x + (CASE WHEN c THEN 1 ELSE 0 END)");
    }
}
