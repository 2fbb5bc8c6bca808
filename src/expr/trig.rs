//! Trigonometric rewriting
//!
//! [`apply`] builds `sin`/`cos` nodes, folding exact values at multiples of
//! 30° and 90°, quarter-turn shifts and odd/even symmetry. [`combine_terms`]
//! recognizes the Pythagorean identity and the angle-sum formulas between two
//! terms of a sum, which is what turns chained joint rotations back into
//! `cos(q1 + q2)` and friends.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::simplify::{Term, simplify};
use super::{EPSILON, Expr, Func, INTEGER_TOLERANCE};

/// Apply `func` to `arg`, rewriting where an exact or simpler form exists.
pub(crate) fn apply(func: Func, arg: Expr) -> Expr {
    if let Some(k) = pi_multiple(&arg) {
        return Expr::Num(exact_value(func, k));
    }
    if arg.is_closed() {
        if let Some(value) = arg.eval(&HashMap::new()) {
            return Expr::Num(func.apply(value));
        }
    }
    if let Some((quarter_turns, rest)) = split_quarter_turns(&arg) {
        return shifted(func, quarter_turns, rest);
    }
    if let Some(flipped) = negated(&arg) {
        return match func {
            Func::Sin => Expr::product([Expr::Num(-1.0), Expr::Func(Func::Sin, Box::new(flipped))]),
            Func::Cos => Expr::Func(Func::Cos, Box::new(flipped)),
        };
    }
    Expr::Func(func, Box::new(arg))
}

/// `k` when `expr` is exactly `k·π`
fn pi_multiple(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Num(n) if *n == 0.0 => Some(0.0),
        Expr::Pi => Some(1.0),
        Expr::Mul(factors) => match factors.as_slice() {
            [Expr::Num(c), Expr::Pi] => Some(*c),
            _ => None,
        },
        _ => None,
    }
}

/// `func(k·π)`, exact at whole multiples of 30° where the value is rational
fn exact_value(func: Func, k: f64) -> f64 {
    let degrees = k * 180.0;
    let nearest = degrees.round();
    if (degrees - nearest).abs() < INTEGER_TOLERANCE && nearest.abs() < 1e15 {
        let d = (nearest as i64).rem_euclid(360);
        // cos(x) = sin(x + 90°)
        let as_sine = match func {
            Func::Sin => d,
            Func::Cos => (d + 90) % 360,
        };
        match as_sine {
            0 | 180 => return 0.0,
            90 => return 1.0,
            270 => return -1.0,
            30 | 150 => return 0.5,
            210 | 330 => return -0.5,
            _ => {}
        }
    }
    func.apply(k * PI)
}

/// Split `x + n·π/2` into `n mod 4` and `x`
fn split_quarter_turns(arg: &Expr) -> Option<(i64, Expr)> {
    let Expr::Add(terms) = arg else {
        return None;
    };
    let pos = terms.iter().position(|t| {
        pi_multiple(t).is_some_and(|k| {
            let halves = 2.0 * k;
            (halves - halves.round()).abs() < INTEGER_TOLERANCE && halves.abs() < 1e15
        })
    })?;
    let halves = 2.0 * pi_multiple(&terms[pos])?;
    let quarter_turns = (halves.round() as i64).rem_euclid(4);
    let rest = Expr::sum(
        terms
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(_, t)| t.clone()),
    );
    Some((quarter_turns, rest))
}

fn shifted(func: Func, quarter_turns: i64, rest: Expr) -> Expr {
    let (target, negate) = match (func, quarter_turns) {
        (Func::Sin, 0) => (Func::Sin, false),
        (Func::Sin, 1) => (Func::Cos, false),
        (Func::Sin, 2) => (Func::Sin, true),
        (Func::Sin, _) => (Func::Cos, true),
        (Func::Cos, 0) => (Func::Cos, false),
        (Func::Cos, 1) => (Func::Sin, true),
        (Func::Cos, 2) => (Func::Cos, true),
        (Func::Cos, _) => (Func::Sin, false),
    };
    let value = apply(target, rest);
    if negate { -value } else { value }
}

/// `-arg` when `arg` carries a leading minus sign
fn negated(arg: &Expr) -> Option<Expr> {
    match arg {
        Expr::Mul(factors) => match factors.first() {
            Some(Expr::Num(c)) if *c < 0.0 => Some(-arg.clone()),
            _ => None,
        },
        Expr::Add(terms) => match terms.first() {
            Some(first) if negated(first).is_some() => {
                Some(Expr::sum(terms.iter().map(|t| -t.clone())))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Find one pair of terms that an identity merges into a single term.
///
/// Returns the full new term list, or `None` when no identity applies.
pub(super) fn combine_terms(terms: &[Term]) -> Option<Vec<Expr>> {
    for i in 0..terms.len() {
        for j in 0..terms.len() {
            if i == j {
                continue;
            }
            let merged = pythagorean(&terms[i], &terms[j])
                .or_else(|| angle_sum(&terms[i], &terms[j]));
            if let Some(merged) = merged {
                let mut out: Vec<Expr> = terms
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i && *k != j)
                    .map(|(_, t)| t.clone().into_expr())
                    .collect();
                out.push(merged);
                return Some(out);
            }
        }
    }
    None
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// The argument of `factor` if it is `func(arg)`
fn func_arg(factor: &Expr, func: Func) -> Option<&Expr> {
    match factor {
        Expr::Func(f, arg) if *f == func => Some(arg.as_ref()),
        _ => None,
    }
}

/// The argument of `factor` if it is `func(arg)^2`
fn squared_arg(factor: &Expr, func: Func) -> Option<&Expr> {
    match factor {
        Expr::Pow(base, exp) if **exp == Expr::Num(2.0) => func_arg(base, func),
        _ => None,
    }
}

fn position_of(term: &Term, func: Func, arg: &Expr) -> Option<usize> {
    term.factors.iter().position(|f| func_arg(f, func) == Some(arg))
}

/// c·r·sin(u)² + c·r·cos(u)² = c·r
fn pythagorean(a: &Term, b: &Term) -> Option<Expr> {
    if !close(a.coeff, b.coeff) {
        return None;
    }
    for (p, factor) in a.factors.iter().enumerate() {
        let Some(u) = squared_arg(factor, Func::Sin) else {
            continue;
        };
        let Some(q) = b.factors.iter().position(|f| squared_arg(f, Func::Cos) == Some(u)) else {
            continue;
        };
        let rest = a.without(&[p]);
        if rest == b.without(&[q]) {
            return Some(Term { coeff: a.coeff, factors: rest }.into_expr());
        }
    }
    None
}

/// cos(x)cos(y) ∓ sin(x)sin(y) = cos(x ± y)
/// sin(x)cos(y) ± cos(x)sin(y) = sin(x ± y)
fn angle_sum(a: &Term, b: &Term) -> Option<Expr> {
    let same = close(a.coeff, b.coeff);
    let opposite = close(a.coeff, -b.coeff);
    if !same && !opposite {
        return None;
    }

    let n = a.factors.len();
    for p in 0..n {
        for q in 0..n {
            if p == q {
                continue;
            }

            if p < q {
                if let (Some(x), Some(y)) = (
                    func_arg(&a.factors[p], Func::Cos),
                    func_arg(&a.factors[q], Func::Cos),
                ) {
                    if let Some(merged) = match_pair(a, b, [p, q], [Func::Sin, Func::Sin], x, y) {
                        let angle = if opposite { sum_of(x, y) } else { difference_of(x, y) };
                        return Some(merged.finish(a.coeff, Func::Cos, angle));
                    }
                }
            }

            if let (Some(x), Some(y)) = (
                func_arg(&a.factors[p], Func::Sin),
                func_arg(&a.factors[q], Func::Cos),
            ) {
                if x == y {
                    continue;
                }
                if let Some(merged) = match_pair(a, b, [p, q], [Func::Cos, Func::Sin], x, y) {
                    let angle = if same { sum_of(x, y) } else { difference_of(x, y) };
                    return Some(merged.finish(a.coeff, Func::Sin, angle));
                }
            }
        }
    }
    None
}

/// Factors shared by both halves of an angle-sum pair
struct Rest(Vec<Expr>);

impl Rest {
    fn finish(self, coeff: f64, func: Func, angle: Expr) -> Expr {
        let mut factors = vec![Expr::Num(coeff)];
        factors.extend(self.0);
        factors.push(apply(func, simplify(&angle)));
        Expr::product(factors)
    }
}

/// Check that `b` is `funcs[0](x)·funcs[1](y)` times the same remaining
/// factors as `a` without positions `skip`.
fn match_pair(a: &Term, b: &Term, skip: [usize; 2], funcs: [Func; 2], x: &Expr, y: &Expr) -> Option<Rest> {
    let r = position_of(b, funcs[0], x)?;
    let s = position_of(b, funcs[1], y)?;
    if r == s {
        return None;
    }
    let rest = a.without(&skip);
    (rest == b.without(&[r, s])).then_some(Rest(rest))
}

fn sum_of(x: &Expr, y: &Expr) -> Expr {
    Expr::sum([x.clone(), y.clone()])
}

fn difference_of(x: &Expr, y: &Expr) -> Expr {
    Expr::sum([x.clone(), -y.clone()])
}
