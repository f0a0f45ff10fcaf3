//! SQL function call helpers.
//!
//! Every helper renders `NAME(arg, ...)` at [`Priority::ATOM`], so calls never
//! need parentheses when used as operands.

use crate::expression::Expression;
use crate::priority::Priority;
use crate::value::{IntoValues, Value, comma_values};

/// `name(args...)`
pub fn function(name: &str, args: impl IntoValues) -> Expression {
    let name = name.to_string();
    let args = args.into_values();
    Expression::computed(Priority::ATOM, move |scope| {
        Ok(format!("{name}({})", comma_values(scope, &args)?))
    })
}

/// `NAME <arg>`, e.g. `EXISTS (SELECT ...)`.
pub fn command(name: &str, arg: impl Into<Value>) -> Expression {
    let name = name.to_string();
    let arg = arg.into();
    Expression::computed(Priority::ATOM, move |scope| {
        Ok(format!("{name} {}", arg.encode(scope)?.0))
    })
}

/// `CONCAT(args...)`
pub fn concat(args: impl IntoValues) -> Expression {
    function("CONCAT", args)
}

/// `COUNT(arg)`
pub fn count(arg: impl Into<Value>) -> Expression {
    function("COUNT", (arg.into(),))
}

/// `COUNT(1)`
pub fn count_all() -> Expression {
    Expression::raw("COUNT(1)")
}

/// `IF(predicate, when_true, when_false)`
pub fn if_(
    predicate: impl Into<Value>,
    when_true: impl Into<Value>,
    when_false: impl Into<Value>,
) -> Expression {
    function("IF", (predicate.into(), when_true.into(), when_false.into()))
}

/// `IFNULL(arg, alternative)`
pub fn if_null(arg: impl Into<Value>, alternative: impl Into<Value>) -> Expression {
    function("IFNULL", (arg.into(), alternative.into()))
}

/// `LENGTH(arg)`
pub fn length(arg: impl Into<Value>) -> Expression {
    function("LENGTH", (arg.into(),))
}

/// `SUM(arg)`
pub fn sum(arg: impl Into<Value>) -> Expression {
    function("SUM", (arg.into(),))
}

/// `AVG(arg)`
pub fn avg(arg: impl Into<Value>) -> Expression {
    function("AVG", (arg.into(),))
}

/// `MIN(arg)`
pub fn min(arg: impl Into<Value>) -> Expression {
    function("MIN", (arg.into(),))
}

/// `MAX(arg)`
pub fn max(arg: impl Into<Value>) -> Expression {
    function("MAX", (arg.into(),))
}

/// `ST_AsText(geometry)`
pub fn st_as_text(geometry: impl Into<Value>) -> Expression {
    function("ST_AsText", (geometry.into(),))
}

/// `ST_GeomFromText(text)`
pub fn st_geom_from_text(text: impl Into<Value>) -> Expression {
    function("ST_GeomFromText", (text.into(),))
}
