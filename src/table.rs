//! DH parameter tables as text
//!
//! ```text
//! # planar 2R arm
//! domain = symbolic
//! 0  a1  0  q1
//! 0  a2  0  q2
//! ```
//!
//! One joint per line with `alpha a d theta` separated by whitespace, so a
//! field holding an expression must not contain spaces. `#` starts a comment.
//! An optional `domain = ...` directive before the first joint selects the
//! parameter type; without one the table is numeric.

use pest::Parser;
use pest::iterators::Pair;

use crate::errors::{CalcError, SourceContext};
use crate::params::RawJoint;
use crate::{DhParser, Request, Rule};

/// Domain used when a table has no `domain = ...` directive
pub const DEFAULT_DOMAIN: &str = "Numeric";

/// Parse a whole table; `name` labels the source in diagnostics.
pub fn parse_table(source: &str, name: &str) -> Result<Request, CalcError> {
    let ctx = SourceContext::new(name, source);
    let pairs = DhParser::parse(Rule::table, source).map_err(|e| CalcError::invalid_table(&ctx, &e))?;

    let mut domain: Option<String> = None;
    let mut joints = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::table {
            continue;
        }
        for line in pair.into_inner() {
            match line.as_rule() {
                Rule::directive => {
                    let span = line.as_span();
                    if domain.is_some() || !joints.is_empty() {
                        return Err(CalcError::InvalidTable {
                            message: "domain directive must come once, before the joints".to_string(),
                            src: ctx.named_source(),
                            span: (span.start(), span.end() - span.start()).into(),
                        });
                    }
                    domain = Some(parse_directive(line));
                }
                Rule::row => joints.push(parse_row(line)),
                _ => {}
            }
        }
    }

    let domain = domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
    crate::log::debug!(source = name, joints = joints.len(), %domain, "parsed DH table");
    Ok(Request {
        joint_count: joints.len().to_string(),
        domain,
        joints,
    })
}

fn parse_directive(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::domain_name)
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn parse_row(pair: Pair<Rule>) -> RawJoint {
    let mut values = pair.into_inner().map(|p| p.as_str().to_string());
    // row = { value ~ value ~ value ~ value }
    let mut next = || values.next().unwrap_or_default();
    let (alpha, a, d, theta) = (next(), next(), next(), next());
    RawJoint { alpha, a, d, theta }
}
