//! Denavit-Hartenberg forward kinematics.
//!
//! Given per-joint `(alpha, a, d, theta)` parameters as raw text, build one
//! 4×4 homogeneous transform per joint and compose them into the pose of the
//! end effector. Parameters are computed either numerically or symbolically,
//! where unknowns such as joint angles stay in the result:
//!
//! ```
//! use dhchain::{Request, RawJoint, calculate, format_matrix, FormatOptions};
//!
//! let request = Request::new("2", "Symbolic")
//!     .with_joint(RawJoint::new("0", "a1", "0", "q1"))
//!     .with_joint(RawJoint::new("0", "a2", "0", "q2"));
//! let calc = calculate(&request).unwrap();
//! let text = format_matrix(&calc.composed, &FormatOptions::default());
//! assert!(text.starts_with("[[cos(q1 + q2) -sin(q1 + q2) 0 a1*cos(q1) + a2*cos(q1 + q2)]"));
//! ```

pub mod chain;
pub mod errors;
pub mod expr;
pub mod format;
pub mod log;
pub mod params;
pub mod parse;
pub mod table;

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "dh.pest"]
pub struct DhParser;

pub use chain::{Chain, ExprMatrix, Kinematics, Matrix};
pub use errors::CalcError;
pub use format::{FormatOptions, Report, format_matrix};
pub use params::{Domain, Field, FieldName, JointParams, RawJoint};
pub use table::parse_table;

/// Everything a caller collected for one run, as raw text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    /// Number of joints as typed
    pub joint_count: String,
    /// Parameter type selector, `Numeric` or `Symbolic`
    pub domain: String,
    pub joints: Vec<RawJoint>,
}

impl Request {
    pub fn new(joint_count: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            joint_count: joint_count.into(),
            domain: domain.into(),
            joints: Vec::new(),
        }
    }

    pub fn with_joint(mut self, joint: RawJoint) -> Self {
        self.joints.push(joint);
        self
    }
}

/// The outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub domain: Domain,
    /// Parsed records, in joint order
    pub params: Vec<JointParams>,
    /// One transform per joint, before composition
    pub transforms: Vec<Matrix>,
    /// Rounded (numeric) or simplified (symbolic) product of `transforms`
    pub composed: Matrix,
}

impl Calculation {
    pub fn report(&self) -> Report<'_> {
        Report::new(self)
    }
}

/// Parse the joint count: a non-negative integer, surrounding whitespace
/// ignored.
pub fn parse_joint_count(text: &str) -> Result<usize, CalcError> {
    text.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CalcError::InvalidJointCount {
            text: text.to_string(),
        })
}

/// Run the whole pipeline.
///
/// Checks happen in order: joint count, number of joints supplied, each
/// field, domain selector. Nothing is computed until all of them pass.
pub fn calculate(request: &Request) -> Result<Calculation, CalcError> {
    let expected = parse_joint_count(&request.joint_count)?;
    if request.joints.len() != expected {
        return Err(CalcError::JointCountMismatch {
            expected,
            found: request.joints.len(),
        });
    }
    crate::log::debug!(joints = expected, "joint count");

    let params = request
        .joints
        .iter()
        .enumerate()
        .map(|(i, raw)| JointParams::from_raw(i + 1, raw))
        .collect::<Result<Vec<_>, _>>()?;

    let domain: Domain = request.domain.parse()?;
    crate::log::debug!(%domain, "parameter type");

    let chain = Chain::new(domain, &params)?;
    let transforms = chain.joint_transforms();
    let composed = chain.compose();

    Ok(Calculation {
        domain,
        params,
        transforms,
        composed,
    })
}
