//! Infix rendering of expressions

use std::fmt;

use super::{Expr, INTEGER_TOLERANCE};

/// Write `expr` in infix form.
///
/// With `digits`, non-integer constants are printed with that many
/// significant digits; without, they use the shortest round-trip form.
pub(super) fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, digits: Option<usize>) -> fmt::Result {
    match expr {
        Expr::Num(n) => write_number(f, *n, digits),
        Expr::Sym(name) => f.write_str(name),
        Expr::Pi => f.write_str("pi"),
        Expr::Add(terms) => write_sum(f, terms, digits),
        Expr::Mul(factors) => write_product(f, factors, digits),
        Expr::Pow(base, exp) => write_power(f, base, exp, digits),
        Expr::Func(func, arg) => {
            write!(f, "{}(", func.name())?;
            write_expr(f, arg, digits)?;
            f.write_str(")")
        }
    }
}

fn write_sum(f: &mut fmt::Formatter<'_>, terms: &[Expr], digits: Option<usize>) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        let (negative, magnitude) = split_sign(term);
        match (i, negative) {
            (0, true) => f.write_str("-")?,
            (0, false) => {}
            (_, true) => f.write_str(" - ")?,
            (_, false) => f.write_str(" + ")?,
        }
        write_expr(f, &magnitude, digits)?;
    }
    Ok(())
}

/// Split a term into its sign and absolute value
fn split_sign(term: &Expr) -> (bool, Expr) {
    match term {
        Expr::Num(n) if *n < 0.0 => (true, Expr::Num(-n)),
        Expr::Mul(factors) => match factors.first() {
            Some(Expr::Num(c)) if *c < 0.0 => {
                let mut flipped = factors.clone();
                flipped[0] = Expr::Num(-c);
                (true, Expr::product(flipped))
            }
            _ => (false, term.clone()),
        },
        _ => (false, term.clone()),
    }
}

fn write_product(f: &mut fmt::Formatter<'_>, factors: &[Expr], digits: Option<usize>) -> fmt::Result {
    let mut coeff = 1.0;
    let mut numer = Vec::new();
    let mut denom = Vec::new();
    for factor in factors {
        match factor {
            Expr::Num(n) => coeff *= n,
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Num(e) if *e < 0.0 => denom.push(Expr::pow(base.as_ref().clone(), Expr::Num(-e))),
                _ => numer.push(factor.clone()),
            },
            other => numer.push(other.clone()),
        }
    }

    if coeff < 0.0 {
        f.write_str("-")?;
        coeff = -coeff;
    }

    let mut first = true;
    if coeff != 1.0 || numer.is_empty() {
        write_number(f, coeff, digits)?;
        first = false;
    }
    for factor in &numer {
        if !first {
            f.write_str("*")?;
        }
        write_factor(f, factor, digits)?;
        first = false;
    }

    match denom.as_slice() {
        [] => Ok(()),
        [single] => {
            f.write_str("/")?;
            write_factor(f, single, digits)
        }
        many => {
            f.write_str("/(")?;
            for (i, factor) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str("*")?;
                }
                write_factor(f, factor, digits)?;
            }
            f.write_str(")")
        }
    }
}

fn write_power(f: &mut fmt::Formatter<'_>, base: &Expr, exp: &Expr, digits: Option<usize>) -> fmt::Result {
    match exp {
        Expr::Num(e) if *e == 0.5 => {
            f.write_str("sqrt(")?;
            write_expr(f, base, digits)?;
            f.write_str(")")
        }
        Expr::Num(e) if *e < 0.0 => {
            f.write_str("1/")?;
            write_factor(f, &Expr::pow(base.clone(), Expr::Num(-e)), digits)
        }
        _ => {
            write_operand(f, base, digits)?;
            f.write_str("^")?;
            write_operand(f, exp, digits)
        }
    }
}

/// A factor of a product: sums need parentheses
fn write_factor(f: &mut fmt::Formatter<'_>, expr: &Expr, digits: Option<usize>) -> fmt::Result {
    match expr {
        Expr::Add(_) => parenthesized(f, expr, digits),
        Expr::Num(n) if *n < 0.0 => parenthesized(f, expr, digits),
        _ => write_expr(f, expr, digits),
    }
}

/// Base or exponent of a power: anything compound needs parentheses
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, digits: Option<usize>) -> fmt::Result {
    match expr {
        Expr::Num(n) if *n >= 0.0 => write_expr(f, expr, digits),
        Expr::Sym(_) | Expr::Pi | Expr::Func(..) => write_expr(f, expr, digits),
        _ => parenthesized(f, expr, digits),
    }
}

fn parenthesized(f: &mut fmt::Formatter<'_>, expr: &Expr, digits: Option<usize>) -> fmt::Result {
    f.write_str("(")?;
    write_expr(f, expr, digits)?;
    f.write_str(")")
}

pub(super) fn write_number(f: &mut fmt::Formatter<'_>, value: f64, digits: Option<usize>) -> fmt::Result {
    if !value.is_finite() {
        return write!(f, "{}", value);
    }
    match digits {
        Some(digits) => {
            let nearest = value.round();
            let snaps = nearest != 0.0 || value == 0.0;
            if snaps && (value - nearest).abs() < INTEGER_TOLERANCE && nearest.abs() < 1e15 {
                write!(f, "{}", nearest as i64)
            } else {
                f.write_str(&format_significant(value, digits))
            }
        }
        None if value.fract() == 0.0 && value.abs() < 1e15 => write!(f, "{}", value as i64),
        None => write!(f, "{}", value),
    }
}

/// Format with `digits` significant digits, keeping trailing zeros
pub(crate) fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    // The exponent is taken after rounding, so 9.99996 counts as 1.000e1
    let scientific = format!("{:.*e}", digits.saturating_sub(1), value);
    let magnitude: i32 = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::super::Expr;
    use super::format_significant;

    fn sym(name: &str) -> Expr {
        Expr::sym(name)
    }

    #[test]
    fn display_atoms() {
        assert_eq!(Expr::Num(3.0).to_string(), "3");
        assert_eq!(Expr::Num(-0.25).to_string(), "-0.25");
        assert_eq!(Expr::Pi.to_string(), "pi");
        assert_eq!(sym("q1").to_string(), "q1");
    }

    #[test]
    fn display_product_with_negative_unit_coefficient() {
        assert_eq!((-Expr::sin(sym("q1"))).to_string(), "-sin(q1)");
    }

    #[test]
    fn display_sum_with_subtraction() {
        let e = Expr::Add(vec![sym("a"), Expr::Mul(vec![Expr::Num(-2.0), sym("b")]), Expr::Num(-1.0)]);
        assert_eq!(e.to_string(), "a - 2*b - 1");
    }

    #[test]
    fn display_quotient() {
        let e = sym("a") / sym("b");
        assert_eq!(e.to_string(), "a/b");
    }

    #[test]
    fn display_sqrt_and_power() {
        assert_eq!(Expr::pow(sym("x"), Expr::Num(0.5)).to_string(), "sqrt(x)");
        assert_eq!(Expr::pow(sym("x") + sym("y"), Expr::Num(2.0)).to_string(), "(x + y)^2");
    }

    #[test]
    fn display_parenthesizes_sum_factor() {
        let e = Expr::Mul(vec![sym("a"), sym("b") + sym("c")]);
        assert_eq!(e.to_string(), "a*(b + c)");
    }

    #[test]
    fn significant_digits() {
        assert_eq!(format_significant(std::f64::consts::FRAC_1_SQRT_2, 4), "0.7071");
        assert_eq!(format_significant(std::f64::consts::PI, 4), "3.142");
        assert_eq!(format_significant(1.5, 4), "1.500");
        assert_eq!(format_significant(-0.5, 4), "-0.5000");
        assert_eq!(format_significant(12345.6, 4), "12346");
    }

    #[test]
    fn significant_digits_after_carry() {
        assert_eq!(format_significant(9.99996, 4), "10.00");
        assert_eq!(format_significant(0.099996, 4), "0.1000");
        assert_eq!(format_significant(-99.996, 4), "-100.0");
        let e = Expr::Num(9.99996) * sym("x");
        assert_eq!(e.evaluate_to_fixed(4).to_string(), "10.00*x");
    }

    #[test]
    fn tiny_coefficients_are_not_shown_as_zero() {
        let e = Expr::Num(1e-13) * sym("x");
        assert_eq!(e.evaluate_to_fixed(4).to_string(), "0.0000000000001000*x");
    }
}
