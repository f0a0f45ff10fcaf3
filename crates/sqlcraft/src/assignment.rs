//! `field = value` pairs for UPDATE and ON DUPLICATE KEY UPDATE.

use crate::error::SqlResult;
use crate::expression::Expression;
use crate::scope::Scope;
use crate::value::Value;

/// An assignment of `value` to `field`.
#[derive(Debug, Clone)]
pub struct Assignment {
    field: Expression,
    value: Value,
}

impl Assignment {
    pub fn new(field: Expression, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// `<field> = <value>`
    pub fn render(&self, scope: &Scope) -> SqlResult<String> {
        let field = self.field.render(scope)?;
        let (value, _) = self.value.encode(scope)?;
        Ok(format!("{field} = {value}"))
    }
}

pub(crate) fn comma_assignments(scope: &Scope, assignments: &[Assignment]) -> SqlResult<String> {
    let rendered = assignments
        .iter()
        .map(|a| a.render(scope))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::raw;

    #[test]
    fn renders_field_and_encoded_value() {
        let scope = Scope::default();
        let a = raw("x").assign(raw("x").add(1));
        assert_eq!(a.render(&scope).unwrap(), "x = x + 1");
        assert_eq!(raw("n").assign("v").render(&scope).unwrap(), "n = 'v'");
        assert_eq!(raw("n").assign(None::<i32>).render(&scope).unwrap(), "n = NULL");
    }

    #[test]
    fn encoding_errors_propagate() {
        let a = raw("x").assign(f64::NAN);
        assert!(a.render(&Scope::default()).is_err());
    }
}
