//! Algebraic simplification
//!
//! Rewrites an expression into a canonical sum of products: nested sums and
//! products are flattened, constants folded, products distributed over sums,
//! equal bases merged into powers, like terms collected, and the trig
//! identities in [`super::trig`] applied until nothing changes.

use std::cmp::Ordering;

use super::trig;
use super::{EPSILON, Expr, canonical_cmp, cmp_slices};

/// Upper bound on whole-tree passes; each pass is a full bottom-up rewrite
const MAX_PASSES: usize = 32;

/// Integer powers of sums up to this exponent are multiplied out
const MAX_EXPANDED_POWER: f64 = 4.0;

/// Simplify `expr` to a fixed point.
pub fn simplify(expr: &Expr) -> Expr {
    let mut current = pass(expr);
    for _ in 0..MAX_PASSES {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    current
}

fn pass(expr: &Expr) -> Expr {
    match expr {
        Expr::Num(_) | Expr::Sym(_) | Expr::Pi => expr.clone(),
        Expr::Add(terms) => simplify_sum(terms.iter().map(pass).collect()),
        Expr::Mul(factors) => simplify_product(factors.iter().map(pass).collect()),
        Expr::Pow(base, exp) => simplify_pow(pass(base), pass(exp)),
        Expr::Func(func, arg) => trig::apply(*func, pass(arg)),
    }
}

/// A product split into its numeric coefficient and its remaining factors,
/// the latter in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Term {
    pub coeff: f64,
    pub factors: Vec<Expr>,
}

impl Term {
    pub fn from_expr(expr: Expr) -> Term {
        match expr {
            Expr::Num(n) => Term { coeff: n, factors: Vec::new() },
            Expr::Mul(items) => {
                let mut coeff = 1.0;
                let mut factors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Expr::Num(n) => coeff *= n,
                        other => factors.push(other),
                    }
                }
                factors.sort_by(canonical_cmp);
                Term { coeff, factors }
            }
            other => Term { coeff: 1.0, factors: vec![other] },
        }
    }

    pub fn into_expr(self) -> Expr {
        if self.factors.is_empty() {
            return Expr::Num(self.coeff);
        }
        let mut items = Vec::with_capacity(self.factors.len() + 1);
        if self.coeff != 1.0 {
            items.push(Expr::Num(self.coeff));
        }
        items.extend(self.factors);
        match items.len() {
            1 => items.pop().unwrap(),
            _ => Expr::Mul(items),
        }
    }

    /// The factors with the given positions removed, order preserved
    pub fn without(&self, skip: &[usize]) -> Vec<Expr> {
        self.factors
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .map(|(_, f)| f.clone())
            .collect()
    }
}

/// Terms with factors first (in canonical order), the constant last
fn term_order(a: &Term, b: &Term) -> Ordering {
    a.factors
        .is_empty()
        .cmp(&b.factors.is_empty())
        .then_with(|| cmp_slices(&a.factors, &b.factors))
        .then_with(|| a.coeff.total_cmp(&b.coeff))
}

pub(super) fn simplify_sum(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    flatten_sum(terms, &mut flat);

    let mut collected: Vec<Term> = Vec::new();
    let mut scale = 0.0f64;
    for term in flat {
        let term = Term::from_expr(term);
        if term.coeff.is_finite() {
            scale = scale.max(term.coeff.abs());
        }
        match collected.iter_mut().find(|t| t.factors == term.factors) {
            Some(existing) => existing.coeff += term.coeff,
            None => collected.push(term),
        }
    }
    // Cancellation residue is small next to the largest input coefficient
    collected.retain(|t| t.coeff.abs() > EPSILON * scale || t.coeff.is_nan());

    // Each identity merges two terms into one, so this recursion is bounded
    if let Some(rewritten) = trig::combine_terms(&collected) {
        return simplify_sum(rewritten);
    }

    collected.sort_by(term_order);
    let mut exprs: Vec<Expr> = collected.into_iter().map(Term::into_expr).collect();
    match exprs.len() {
        0 => Expr::ZERO,
        1 => exprs.pop().unwrap(),
        _ => Expr::Add(exprs),
    }
}

fn flatten_sum(terms: Vec<Expr>, out: &mut Vec<Expr>) {
    for term in terms {
        match term {
            Expr::Add(inner) => flatten_sum(inner, out),
            other => out.push(other),
        }
    }
}

fn flatten_product(factors: Vec<Expr>, out: &mut Vec<Expr>) {
    for factor in factors {
        match factor {
            Expr::Mul(inner) => flatten_product(inner, out),
            other => out.push(other),
        }
    }
}

pub(super) fn simplify_product(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    flatten_product(factors, &mut flat);

    // Distribute over the first sum
    if flat.len() > 1 {
        if let Some(pos) = flat.iter().position(|f| matches!(f, Expr::Add(_))) {
            let mut rest = flat;
            let Expr::Add(terms) = rest.remove(pos) else {
                unreachable!("position matched a sum")
            };
            let expanded = terms
                .into_iter()
                .map(|term| {
                    let mut product = rest.clone();
                    product.push(term);
                    simplify_product(product)
                })
                .collect();
            return simplify_sum(expanded);
        }
    }

    let mut coeff = 1.0;
    let mut powers: Vec<(Expr, Expr)> = Vec::new();
    for factor in flat {
        match factor {
            Expr::Num(n) => coeff *= n,
            Expr::Pow(base, exp) => push_power(&mut powers, *base, *exp),
            other => push_power(&mut powers, other, Expr::ONE),
        }
    }
    if coeff == 0.0 {
        return Expr::ZERO;
    }

    let mut factors = Vec::with_capacity(powers.len());
    for (base, exp) in powers {
        match simplify_pow(base, exp) {
            Expr::Num(n) => coeff *= n,
            other => factors.push(other),
        }
    }

    // Powers of products and sums come back as products and sums
    if factors.iter().any(|f| matches!(f, Expr::Add(_) | Expr::Mul(_))) {
        factors.push(Expr::Num(coeff));
        return simplify_product(factors);
    }

    factors.sort_by(canonical_cmp);
    Term { coeff, factors }.into_expr()
}

fn push_power(powers: &mut Vec<(Expr, Expr)>, base: Expr, exp: Expr) {
    match powers.iter_mut().find(|(b, _)| *b == base) {
        Some((_, existing)) => *existing = simplify_sum(vec![existing.clone(), exp]),
        None => powers.push((base, exp)),
    }
}

fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    if let Expr::Num(e) = exp {
        if e == 0.0 {
            return Expr::ONE;
        }
        if e == 1.0 {
            return base;
        }
        let integral = e.fract() == 0.0;
        return match base {
            Expr::Num(b) => Expr::pow(Expr::Num(b), Expr::Num(e)),
            Expr::Pow(inner_base, inner_exp) if integral => {
                simplify_pow(*inner_base, simplify_product(vec![*inner_exp, Expr::Num(e)]))
            }
            Expr::Mul(items) if integral => {
                simplify_product(items.into_iter().map(|item| simplify_pow(item, Expr::Num(e))).collect())
            }
            Expr::Add(terms) if integral && (2.0..=MAX_EXPANDED_POWER).contains(&e) => {
                simplify_product(vec![Expr::Add(terms); e as usize])
            }
            other => Expr::Pow(Box::new(other), Box::new(Expr::Num(e))),
        };
    }
    if base == Expr::ONE {
        return Expr::ONE;
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}
