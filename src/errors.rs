//! Error types with rich diagnostics using miette
//!
//! Parameter and table errors carry source spans so a bad field points at the
//! offending text.

use miette::{Diagnostic, NamedSource, SourceSpan};
use pest::error::InputLocation;
use thiserror::Error;

use crate::Rule;
use crate::params::FieldName;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename, or which field of which joint)
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

/// The span a pest error points at, clamped to the source
pub(crate) fn pest_span(err: &pest::error::Error<Rule>, source: &str) -> SourceSpan {
    let (start, end) = match err.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span((start, end)) => (start, end),
    };
    let start = start.min(source.len());
    let end = end.clamp(start, source.len());
    (start, end - start).into()
}

/// Everything that can abort a calculation
#[derive(Error, Diagnostic, Debug)]
pub enum CalcError {
    #[error("invalid joint count: {text:?}")]
    #[diagnostic(
        code(dhchain::input::invalid_joint_count),
        help("the joint count must be a non-negative integer")
    )]
    InvalidJointCount { text: String },

    #[error("expected {expected} joints, got {found}")]
    #[diagnostic(code(dhchain::input::joint_count_mismatch))]
    JointCountMismatch { expected: usize, found: usize },

    #[error("invalid {field} for joint {joint}")]
    #[diagnostic(code(dhchain::input::invalid_parameter))]
    InvalidParameter {
        joint: usize,
        field: FieldName,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("unrecognized parameter type: {text:?}")]
    #[diagnostic(
        code(dhchain::input::unrecognized_domain),
        help("expected `Numeric` or `Symbolic`")
    )]
    UnrecognizedDomain { text: String },

    #[error("{field} of joint {joint} has no numeric value: `{symbol}` is unbound")]
    #[diagnostic(
        code(dhchain::numeric::unbound_symbol),
        help("use the Symbolic parameter type to keep unknowns")
    )]
    UnboundSymbol {
        joint: usize,
        field: FieldName,
        symbol: String,
    },

    #[error("invalid DH table")]
    #[diagnostic(code(dhchain::table::invalid))]
    InvalidTable {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },
}

impl CalcError {
    /// A parameter error for `source`, spanning what pest rejected
    pub(crate) fn invalid_parameter(
        joint: usize,
        field: FieldName,
        source: &str,
        err: &pest::error::Error<Rule>,
    ) -> Self {
        let ctx = SourceContext::new(format!("joint {} {}", joint, field), source);
        let message = match source.trim() {
            "" => "empty parameter".to_string(),
            _ => err.variant.message().into_owned(),
        };
        CalcError::InvalidParameter {
            joint,
            field,
            message,
            span: pest_span(err, source),
            src: ctx.named_source(),
        }
    }

    /// A table error spanning what pest rejected in `ctx`
    pub(crate) fn invalid_table(ctx: &SourceContext, err: &pest::error::Error<Rule>) -> Self {
        CalcError::InvalidTable {
            message: err.variant.message().into_owned(),
            span: pest_span(err, &ctx.source),
            src: ctx.named_source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expr;

    #[test]
    fn parameter_error_points_at_rejected_text() {
        let err = parse_expr("q1 +").unwrap_err();
        let CalcError::InvalidParameter { span, joint, field, .. } =
            CalcError::invalid_parameter(2, FieldName::Theta, "q1 +", &err)
        else {
            panic!("expected InvalidParameter");
        };
        assert_eq!((joint, field), (2, FieldName::Theta));
        assert_eq!(span.offset(), 4);
    }

    #[test]
    fn empty_parameter_message() {
        let err = parse_expr("").unwrap_err();
        let e = CalcError::invalid_parameter(1, FieldName::A, "", &err);
        let CalcError::InvalidParameter { message, span, .. } = e else {
            panic!("expected InvalidParameter");
        };
        assert_eq!(message, "empty parameter");
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn display_names_joint_and_field() {
        let e = CalcError::UnboundSymbol {
            joint: 3,
            field: FieldName::Alpha,
            symbol: "q".to_string(),
        };
        assert_eq!(e.to_string(), "alpha of joint 3 has no numeric value: `q` is unbound");
    }
}
