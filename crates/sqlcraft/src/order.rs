//! ORDER BY items.

use crate::error::SqlResult;
use crate::expression::Expression;
use crate::scope::Scope;

/// One ORDER BY item.
#[derive(Debug, Clone)]
pub struct OrderBy {
    by: Expression,
    desc: bool,
}

impl OrderBy {
    pub fn new(by: Expression, desc: bool) -> Self {
        Self { by, desc }
    }

    pub fn render(&self, scope: &Scope) -> SqlResult<String> {
        let sql = self.by.render(scope)?;
        Ok(if self.desc { format!("{sql} DESC") } else { sql })
    }
}

impl From<Expression> for OrderBy {
    fn from(by: Expression) -> Self {
        Self::new(by, false)
    }
}

impl From<&Expression> for OrderBy {
    fn from(by: &Expression) -> Self {
        Self::new(by.clone(), false)
    }
}

pub(crate) fn comma_order_bys(scope: &Scope, order_bys: &[OrderBy]) -> SqlResult<String> {
    let rendered = order_bys
        .iter()
        .map(|o| o.render(scope))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::raw;

    #[test]
    fn direction() {
        let scope = Scope::default();
        assert_eq!(raw("x").desc().render(&scope).unwrap(), "x DESC");
        assert_eq!(raw("x").asc().render(&scope).unwrap(), "x");
        let items: Vec<OrderBy> = vec![raw("a").into(), raw("b").desc()];
        assert_eq!(comma_order_bys(&scope, &items).unwrap(), "a, b DESC");
    }
}
