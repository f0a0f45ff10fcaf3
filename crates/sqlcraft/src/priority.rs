//! Operator precedence levels.
//!
//! Lower values bind tighter. Atoms (identifiers, literals, function calls,
//! parenthesized subqueries) sit at level 0 and never need wrapping.

use std::fmt;

/// Binding strength of a rendered SQL fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(u8);

impl Priority {
    /// Identifiers, literals, function calls, parenthesized expressions.
    pub const ATOM: Priority = Priority(0);
    /// `INTERVAL`
    pub const INTERVAL: Priority = Priority(1);
    /// `BINARY`, `COLLATE`
    pub const COLLATE: Priority = Priority(2);
    /// `!`
    pub const BANG: Priority = Priority(3);
    /// Unary minus, `~`
    pub const UNARY: Priority = Priority(4);
    /// `^`
    pub const BIT_XOR: Priority = Priority(5);
    /// `*`, `/`, `DIV`, `%`, `MOD`
    pub const MULTIPLICATIVE: Priority = Priority(6);
    /// `+`, `-`
    pub const ADDITIVE: Priority = Priority(7);
    /// `<<`, `>>`
    pub const SHIFT: Priority = Priority(8);
    /// `&`
    pub const BIT_AND: Priority = Priority(9);
    /// `|`
    pub const BIT_OR: Priority = Priority(10);
    /// `=`, `<>`, `<`, `<=`, `>`, `>=`, `IS`, `LIKE`, `IN`
    pub const COMPARISON: Priority = Priority(11);
    /// `BETWEEN`, `CASE`
    pub const BETWEEN: Priority = Priority(12);
    /// `NOT`
    pub const NOT: Priority = Priority(13);
    /// `AND`, `&&`
    pub const AND: Priority = Priority(14);
    /// `XOR`
    pub const XOR: Priority = Priority(15);
    /// `OR`, `||`
    pub const OR: Priority = Priority(16);
    /// `=` used as assignment, `:=`
    pub const ASSIGNMENT: Priority = Priority(17);

    /// Build a priority from a raw level.
    pub const fn new(level: u8) -> Self {
        Priority(level)
    }

    /// The raw level.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Whether a left operand at `self` must be wrapped under an operator at `op`.
    pub(crate) fn wraps_left_of(self, op: Priority) -> bool {
        self > op
    }

    /// Whether a right operand at `self` must be wrapped under an operator at `op`.
    ///
    /// Ties wrap on the right so same-level chains stay left-associative.
    pub(crate) fn wraps_right_of(self, op: Priority) -> bool {
        self >= op
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrap `sql` in parentheses when `wrap` holds.
pub(crate) fn parenthesize(sql: String, wrap: bool) -> String {
    if wrap { format!("({sql})") } else { sql }
}
