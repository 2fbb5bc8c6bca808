//! Integer detection and fixed-precision evaluation

use std::collections::HashMap;
use std::fmt;

use super::display::write_expr;
use super::{Expr, INTEGER_TOLERANCE};

impl Expr {
    /// True when the expression has no unknowns and evaluates to an integer
    /// (within [`INTEGER_TOLERANCE`]).
    pub fn is_integer_valued(&self) -> bool {
        self.as_integer().is_some()
    }

    /// The integer this expression evaluates to, if it is integer-valued
    pub fn as_integer(&self) -> Option<i64> {
        if !self.is_closed() {
            return None;
        }
        let value = self.eval(&HashMap::new())?;
        let nearest = value.round();
        (value.is_finite() && (value - nearest).abs() < INTEGER_TOLERANCE && nearest.abs() < 1e15)
            .then_some(nearest as i64)
    }

    /// Collapse every closed subexpression to a number and render constants
    /// with `digits` significant digits. Unknowns are kept.
    pub fn evaluate_to_fixed(&self, digits: usize) -> Fixed {
        Fixed {
            expr: collapse(self),
            digits,
        }
    }
}

fn collapse(expr: &Expr) -> Expr {
    if expr.is_closed() {
        if let Some(value) = expr.eval(&HashMap::new()) {
            return Expr::Num(value);
        }
    }
    match expr {
        Expr::Add(terms) => Expr::sum(terms.iter().map(collapse)),
        Expr::Mul(factors) => Expr::product(factors.iter().map(collapse)),
        Expr::Pow(base, exp) => Expr::pow(collapse(base), collapse(exp)),
        Expr::Func(func, arg) => Expr::Func(*func, Box::new(collapse(arg))),
        other => other.clone(),
    }
}

/// An expression rendered with a fixed number of significant digits
#[derive(Debug, Clone, PartialEq)]
pub struct Fixed {
    expr: Expr,
    digits: usize,
}

impl Fixed {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, &self.expr, Some(self.digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_valued() {
        assert_eq!(Expr::Num(3.0).as_integer(), Some(3));
        assert_eq!(Expr::Num(-1.0 + 1e-12).as_integer(), Some(-1));
        assert!(Expr::cos(Expr::Pi).is_integer_valued());
        assert!(!Expr::Num(0.5).is_integer_valued());
        assert!(!Expr::sym("a").is_integer_valued());
    }

    #[test]
    fn fixed_keeps_unknowns() {
        let e = Expr::sym("a") * Expr::cos(Expr::degrees(45.0));
        assert_eq!(e.evaluate_to_fixed(4).to_string(), "0.7071*a");
    }

    #[test]
    fn fixed_collapses_closed_subtrees() {
        let e = Expr::pow(Expr::Num(2.0), Expr::Num(0.5)) + Expr::sym("d");
        assert_eq!(e.evaluate_to_fixed(4).to_string(), "d + 1.414");
    }

    #[test]
    fn fixed_prints_whole_numbers_bare() {
        let e = Expr::Num(2.0) * Expr::sym("x");
        assert_eq!(e.evaluate_to_fixed(4).to_string(), "2*x");
    }
}
