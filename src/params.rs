//! Joint parameter records
//!
//! Raw text for each of a joint's four DH parameters is turned into a
//! [`Field`]: a plain number when the text parses as one, otherwise a
//! symbolic expression.

use std::fmt;
use std::str::FromStr;

use crate::errors::CalcError;
use crate::expr::Expr;
use crate::parse::parse_expr;

/// The four DH parameters of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Twist angle α about the common normal, in degrees
    Alpha,
    /// Link length along the common normal
    A,
    /// Link offset along the previous z axis
    D,
    /// Joint angle θ about the previous z axis, in degrees
    Theta,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [FieldName::Alpha, FieldName::A, FieldName::D, FieldName::Theta];

    /// True for α and θ, which are given in degrees
    pub fn is_angle(self) -> bool {
        matches!(self, FieldName::Alpha | FieldName::Theta)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldName::Alpha => "alpha",
            FieldName::A => "a",
            FieldName::D => "d",
            FieldName::Theta => "theta",
        })
    }
}

/// One parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A number as entered (degrees for angles)
    Literal(f64),
    /// An expression, possibly with unknowns (radians for angles)
    Symbol(Expr),
}

impl Field {
    /// Parse the text of one field: a number if possible, else an expression.
    pub fn parse(joint: usize, name: FieldName, text: &str) -> Result<Field, CalcError> {
        let trimmed = text.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(Field::Literal(value));
        }
        match parse_expr(trimmed) {
            Ok(expr) => {
                crate::log::debug!(joint, field = %name, text = trimmed, "field kept as expression");
                Ok(Field::Symbol(expr))
            }
            Err(err) => Err(CalcError::invalid_parameter(joint, name, trimmed, &err)),
        }
    }

    /// The angle in radians as an expression.
    ///
    /// Literals are degrees and get converted; expressions are used as given.
    pub fn angle_expr(&self) -> Expr {
        match self {
            Field::Literal(v) => Expr::degrees(*v),
            Field::Symbol(e) => e.clone(),
        }
    }

    /// The value as an expression, without unit conversion
    pub fn length_expr(&self) -> Expr {
        match self {
            Field::Literal(v) => Expr::Num(*v),
            Field::Symbol(e) => e.clone(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Literal(v) => write!(f, "{}", v),
            Field::Symbol(e) => write!(f, "{}", e),
        }
    }
}

/// A joint's parameters exactly as the caller typed them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawJoint {
    pub alpha: String,
    pub a: String,
    pub d: String,
    pub theta: String,
}

impl RawJoint {
    pub fn new(
        alpha: impl Into<String>,
        a: impl Into<String>,
        d: impl Into<String>,
        theta: impl Into<String>,
    ) -> Self {
        Self {
            alpha: alpha.into(),
            a: a.into(),
            d: d.into(),
            theta: theta.into(),
        }
    }

    fn text(&self, name: FieldName) -> &str {
        match name {
            FieldName::Alpha => &self.alpha,
            FieldName::A => &self.a,
            FieldName::D => &self.d,
            FieldName::Theta => &self.theta,
        }
    }
}

/// One joint's parsed parameter record
#[derive(Debug, Clone, PartialEq)]
pub struct JointParams {
    pub alpha: Field,
    pub a: Field,
    pub d: Field,
    pub theta: Field,
}

impl JointParams {
    /// Parse every field of `raw`; `joint` is 1-based and only used in errors.
    pub fn from_raw(joint: usize, raw: &RawJoint) -> Result<Self, CalcError> {
        let [alpha, a, d, theta] = FieldName::ALL;
        Ok(Self {
            alpha: Field::parse(joint, alpha, raw.text(alpha))?,
            a: Field::parse(joint, a, raw.text(a))?,
            d: Field::parse(joint, d, raw.text(d))?,
            theta: Field::parse(joint, theta, raw.text(theta))?,
        })
    }

    pub fn field(&self, name: FieldName) -> &Field {
        match name {
            FieldName::Alpha => &self.alpha,
            FieldName::A => &self.a,
            FieldName::D => &self.d,
            FieldName::Theta => &self.theta,
        }
    }

    /// True when every field is a plain number
    pub fn is_literal(&self) -> bool {
        FieldName::ALL
            .iter()
            .all(|name| matches!(self.field(*name), Field::Literal(_)))
    }
}

/// Which coefficient domain a run computes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Numeric,
    Symbolic,
}

impl FromStr for Domain {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("numeric") {
            Ok(Domain::Numeric)
        } else if trimmed.eq_ignore_ascii_case("symbolic") {
            Ok(Domain::Symbolic)
        } else {
            Err(CalcError::UnrecognizedDomain { text: s.to_string() })
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Domain::Numeric => "Numeric",
            Domain::Symbolic => "Symbolic",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_is_literal() {
        assert_eq!(Field::parse(1, FieldName::A, " 1.5 ").unwrap(), Field::Literal(1.5));
        assert_eq!(Field::parse(1, FieldName::Alpha, "-90").unwrap(), Field::Literal(-90.0));
    }

    #[test]
    fn other_text_falls_back_to_expression() {
        assert_eq!(
            Field::parse(1, FieldName::Theta, "q1").unwrap(),
            Field::Symbol(Expr::sym("q1"))
        );
        assert!(matches!(
            Field::parse(1, FieldName::Theta, "q2 + pi/2").unwrap(),
            Field::Symbol(_)
        ));
    }

    #[test]
    fn unparsable_text_is_an_error() {
        let err = Field::parse(2, FieldName::D, "a b").unwrap_err();
        assert!(matches!(
            err,
            CalcError::InvalidParameter { joint: 2, field: FieldName::D, .. }
        ));
        assert!(Field::parse(1, FieldName::D, "   ").is_err());
    }

    #[test]
    fn literal_angles_convert_to_radians() {
        assert_eq!(Field::Literal(180.0).angle_expr(), Expr::Pi);
        assert_eq!(Field::Symbol(Expr::sym("q")).angle_expr(), Expr::sym("q"));
        assert_eq!(Field::Literal(180.0).length_expr(), Expr::Num(180.0));
    }

    #[test]
    fn record_from_raw_text() {
        let params = JointParams::from_raw(1, &RawJoint::new("90", "a1", "0", "q1")).unwrap();
        assert_eq!(params.alpha, Field::Literal(90.0));
        assert_eq!(params.a, Field::Symbol(Expr::sym("a1")));
        assert!(!params.is_literal());
    }

    #[test]
    fn domain_selector() {
        assert_eq!(" numeric ".parse::<Domain>().unwrap(), Domain::Numeric);
        assert_eq!("SYMBOLIC".parse::<Domain>().unwrap(), Domain::Symbolic);
        assert!(matches!(
            "Complex".parse::<Domain>(),
            Err(CalcError::UnrecognizedDomain { .. })
        ));
    }
}
