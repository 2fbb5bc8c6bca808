//! Parse pest pairs into expression trees

use crate::expr::Expr;
use crate::{DhParser, Rule};
use pest::Parser;
use pest::error::ErrorVariant;
use pest::iterators::Pair;

/// Parse the text of one symbolic parameter into an expression.
///
/// No simplification happens here beyond what the [`Expr`] constructors do.
pub fn parse_expr(source: &str) -> Result<Expr, pest::error::Error<Rule>> {
    let pairs = DhParser::parse(Rule::field, source)?;

    // field = { SOI ~ expr ~ EOI }
    for pair in pairs {
        if pair.as_rule() == Rule::field {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::expr {
                    return build_expr(inner);
                }
            }
        }
    }

    unreachable!("field rule always contains an expr")
}

type BuildResult = Result<Expr, pest::error::Error<Rule>>;

fn build_expr(pair: Pair<Rule>) -> BuildResult {
    let mut inner = pair.into_inner();
    let mut terms = vec![build_term(inner.next().unwrap())?];
    while let Some(op) = inner.next() {
        let rhs = build_term(inner.next().unwrap())?;
        match op.as_str() {
            "-" => terms.push(-rhs),
            _ => terms.push(rhs),
        }
    }
    Ok(Expr::sum(terms))
}

fn build_term(pair: Pair<Rule>) -> BuildResult {
    let mut inner = pair.into_inner();
    let mut factors = vec![build_factor(inner.next().unwrap())?];
    while let Some(op) = inner.next() {
        let rhs = build_factor(inner.next().unwrap())?;
        match op.as_str() {
            "/" => factors.push(Expr::pow(rhs, Expr::Num(-1.0))),
            _ => factors.push(rhs),
        }
    }
    Ok(Expr::product(factors))
}

fn build_factor(pair: Pair<Rule>) -> BuildResult {
    let mut inner = pair.into_inner();
    let first = inner.next().unwrap();
    match first.as_rule() {
        Rule::sign => {
            let operand = build_factor(inner.next().unwrap())?;
            Ok(if first.as_str() == "-" { -operand } else { operand })
        }
        Rule::power => build_power(first),
        rule => unreachable!("unexpected rule in factor: {:?}", rule),
    }
}

fn build_power(pair: Pair<Rule>) -> BuildResult {
    let mut inner = pair.into_inner();
    let base = build_primary(inner.next().unwrap())?;
    match inner.next() {
        Some(exponent) => Ok(Expr::pow(base, build_factor(exponent)?)),
        None => Ok(base),
    }
}

fn build_primary(pair: Pair<Rule>) -> BuildResult {
    match pair.as_rule() {
        Rule::number => Ok(Expr::Num(parse_number(pair.as_str()))),
        Rule::ident => Ok(build_ident(pair.as_str())),
        Rule::call => build_call(pair),
        Rule::expr => build_expr(pair),
        rule => unreachable!("unexpected rule in primary: {:?}", rule),
    }
}

fn build_ident(name: &str) -> Expr {
    match name {
        "pi" => Expr::Pi,
        _ => Expr::Sym(name.to_string()),
    }
}

fn build_call(pair: Pair<Rule>) -> BuildResult {
    let mut inner = pair.into_inner();
    let name_pair = inner.next().unwrap();
    let arg = build_expr(inner.next().unwrap())?;
    match name_pair.as_str() {
        "sin" => Ok(Expr::sin(arg)),
        "cos" => Ok(Expr::cos(arg)),
        "tan" => Ok(Expr::sin(arg.clone()) * Expr::pow(Expr::cos(arg), Expr::Num(-1.0))),
        "sqrt" => Ok(Expr::pow(arg, Expr::Num(0.5))),
        name => Err(pest::error::Error::new_from_span(
            ErrorVariant::CustomError {
                message: format!("unknown function `{}` (expected sin, cos, tan or sqrt)", name),
            },
            name_pair.as_span(),
        )),
    }
}

fn parse_number(text: &str) -> f64 {
    // The grammar only admits well-formed decimal literals
    text.parse().unwrap_or(f64::NAN)
}
