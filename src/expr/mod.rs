//! Symbolic expression trees
//!
//! This module is organized into submodules:
//! - `display`: infix rendering shared by [`Expr`]'s `Display` and [`Fixed`]
//! - `simplify`: canonicalization, like-term collection and identities
//! - `trig`: exact trig values, symmetries and angle recombination
//! - `fixed`: integer predicate and fixed-precision evaluation
//!
//! The constructors on [`Expr`] (`sum`, `product`, `pow`, `sin`, `cos`) do the
//! cheap work eagerly: flattening, folding numeric constants, dropping zero
//! terms and unit factors, and exact trig values. Everything else waits for
//! [`simplify`].

mod display;
mod fixed;
mod simplify;
mod trig;

pub use fixed::Fixed;
pub use simplify::simplify;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Tolerance used when comparing numeric coefficients
pub(crate) const EPSILON: f64 = 1e-12;

/// Values closer than this to an integer are treated as that integer
pub(crate) const INTEGER_TOLERANCE: f64 = 1e-9;

/// A symbolic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric constant
    Num(f64),
    /// Named unknown, e.g. an unresolved joint angle
    Sym(String),
    /// The constant π, kept exact so trig values at its multiples stay exact
    Pi,
    /// Sum of two or more terms
    Add(Vec<Expr>),
    /// Product of two or more factors
    Mul(Vec<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Trigonometric function application
    Func(Func, Box<Expr>),
}

/// Trigonometric functions known to the simplifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
        }
    }
}

impl Expr {
    pub const ZERO: Expr = Expr::Num(0.0);
    pub const ONE: Expr = Expr::Num(1.0);

    /// A named unknown
    pub fn sym(name: impl Into<String>) -> Expr {
        Expr::Sym(name.into())
    }

    /// An angle given in degrees, as an exact multiple of π radians
    pub fn degrees(value: f64) -> Expr {
        Expr::product([Expr::Num(value / 180.0), Expr::Pi])
    }

    /// Sum of `terms`, flattened, with numeric terms folded into one constant.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Expr {
        let mut constant = 0.0;
        let mut rest = Vec::new();
        collect_sum(terms, &mut constant, &mut rest);

        if constant != 0.0 || rest.is_empty() {
            rest.push(Expr::Num(constant));
        }
        match rest.len() {
            1 => rest.pop().unwrap(),
            _ => Expr::Add(rest),
        }
    }

    /// Product of `factors`, flattened, with numeric factors folded into a
    /// leading coefficient. A zero coefficient absorbs the whole product.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Expr {
        let mut coeff = 1.0;
        let mut rest = Vec::new();
        collect_product(factors, &mut coeff, &mut rest);

        if coeff == 0.0 || rest.is_empty() {
            return Expr::Num(coeff);
        }
        if coeff != 1.0 {
            rest.insert(0, Expr::Num(coeff));
        }
        match rest.len() {
            1 => rest.pop().unwrap(),
            _ => Expr::Mul(rest),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        if let Expr::Num(e) = &exponent {
            let e = *e;
            if e == 0.0 {
                return Expr::ONE;
            }
            if e == 1.0 {
                return base;
            }
            if let Expr::Num(b) = &base {
                let value = b.powf(e);
                if value.is_finite() {
                    return Expr::Num(value);
                }
            }
        }
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn sin(arg: Expr) -> Expr {
        trig::apply(Func::Sin, arg)
    }

    pub fn cos(arg: Expr) -> Expr {
        trig::apply(Func::Cos, arg)
    }

    /// Evaluate numerically, substituting `bindings` for unknowns.
    ///
    /// Returns `None` if an unknown has no binding.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Option<f64> {
        Some(match self {
            Expr::Num(n) => *n,
            Expr::Sym(name) => *bindings.get(name)?,
            Expr::Pi => std::f64::consts::PI,
            Expr::Add(terms) => terms.iter().map(|t| t.eval(bindings)).sum::<Option<f64>>()?,
            Expr::Mul(factors) => factors
                .iter()
                .map(|f| f.eval(bindings))
                .product::<Option<f64>>()?,
            Expr::Pow(base, exp) => base.eval(bindings)?.powf(exp.eval(bindings)?),
            Expr::Func(func, arg) => func.apply(arg.eval(bindings)?),
        })
    }

    /// Names of every unknown in the expression, sorted
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_symbols(&mut out);
        out
    }

    /// True when the expression contains no unknowns
    pub fn is_closed(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Pi => true,
            Expr::Sym(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(Expr::is_closed),
            Expr::Pow(base, exp) => base.is_closed() && exp.is_closed(),
            Expr::Func(_, arg) => arg.is_closed(),
        }
    }

    fn visit_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Num(_) | Expr::Pi => {}
            Expr::Sym(name) => {
                out.insert(name.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.visit_symbols(out);
                }
            }
            Expr::Pow(base, exp) => {
                base.visit_symbols(out);
                exp.visit_symbols(out);
            }
            Expr::Func(_, arg) => arg.visit_symbols(out),
        }
    }
}

fn collect_sum(terms: impl IntoIterator<Item = Expr>, constant: &mut f64, rest: &mut Vec<Expr>) {
    for term in terms {
        match term {
            Expr::Num(n) => *constant += n,
            Expr::Add(inner) => collect_sum(inner, constant, rest),
            other => rest.push(other),
        }
    }
}

fn collect_product(
    factors: impl IntoIterator<Item = Expr>,
    coeff: &mut f64,
    rest: &mut Vec<Expr>,
) {
    for factor in factors {
        match factor {
            Expr::Num(n) => *coeff *= n,
            Expr::Mul(inner) => collect_product(inner, coeff, rest),
            other => rest.push(other),
        }
    }
}

/// Total order used to put sums and products into canonical form:
/// numbers, then π, unknowns by name, functions, products, sums.
pub(crate) fn canonical_cmp(a: &Expr, b: &Expr) -> Ordering {
    fn rank(e: &Expr) -> u8 {
        match e {
            Expr::Num(_) => 0,
            Expr::Pi => 1,
            Expr::Sym(_) => 2,
            Expr::Pow(..) => 3,
            Expr::Func(..) => 4,
            Expr::Mul(_) => 5,
            Expr::Add(_) => 6,
        }
    }

    // A power sorts next to its base; a bare base counts as exponent one
    fn split_power(e: &Expr) -> (&Expr, Option<&Expr>) {
        match e {
            Expr::Pow(base, exp) => (base, Some(exp)),
            _ => (e, None),
        }
    }

    if matches!(a, Expr::Pow(..)) || matches!(b, Expr::Pow(..)) {
        let (base_a, exp_a) = split_power(a);
        let (base_b, exp_b) = split_power(b);
        return canonical_cmp(base_a, base_b).then_with(|| match (exp_a, exp_b) {
            (Some(x), Some(y)) => canonical_cmp(x, y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) => x.total_cmp(y),
        (Expr::Sym(x), Expr::Sym(y)) => x.cmp(y),
        (Expr::Func(f1, a1), Expr::Func(f2, a2)) => {
            canonical_cmp(a1, a2).then_with(|| f1.cmp(f2))
        }
        (Expr::Mul(x), Expr::Mul(y)) | (Expr::Add(x), Expr::Add(y)) => cmp_slices(x, y),
        _ => rank(a).cmp(&rank(b)),
    }
}

pub(crate) fn cmp_slices(a: &[Expr], b: &[Expr]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match canonical_cmp(x, y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display::write_expr(f, self, None)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Num(value)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr { Expr::sum([self, rhs]) }
}
impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr { Expr::sum([self, -rhs]) }
}
impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr { Expr::product([self, rhs]) }
}
impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr { Expr::product([self, Expr::pow(rhs, Expr::Num(-1.0))]) }
}
impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr { Expr::product([Expr::Num(-1.0), self]) }
}
