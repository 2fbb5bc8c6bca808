//! Per-joint DH transforms and their composition
//!
//! Both coefficient domains share one algorithm: build a transform per joint,
//! then fold them left to right starting from the identity. They differ in
//! how the composed matrix is finalized. Numeric results are rounded to
//! integers (ties to even); symbolic results are simplified.

use std::array;
use std::collections::HashMap;
use std::ops::Mul;

use enum_dispatch::enum_dispatch;
use glam::{DMat4, DVec4};

use crate::errors::CalcError;
use crate::expr::{Expr, simplify};
use crate::params::{Domain, Field, FieldName, JointParams};

/// A 4×4 matrix of expressions, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ExprMatrix(pub [[Expr; 4]; 4]);

impl ExprMatrix {
    pub fn identity() -> Self {
        Self(array::from_fn(|i| {
            array::from_fn(|j| if i == j { Expr::ONE } else { Expr::ZERO })
        }))
    }

    pub fn rows(&self) -> &[[Expr; 4]; 4] {
        &self.0
    }

    pub fn get(&self, row: usize, col: usize) -> &Expr {
        &self.0[row][col]
    }

    pub fn map(&self, f: impl Fn(&Expr) -> Expr) -> Self {
        Self(array::from_fn(|i| array::from_fn(|j| f(&self.0[i][j]))))
    }

    /// Simplify every entry
    pub fn simplify(&self) -> Self {
        self.map(simplify)
    }

    /// Evaluate every entry; `None` if any entry has an unbound unknown.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Option<DMat4> {
        let mut rows = [[0.0; 4]; 4];
        for (i, row) in self.0.iter().enumerate() {
            for (j, entry) in row.iter().enumerate() {
                rows[i][j] = entry.eval(bindings)?;
            }
        }
        Some(DMat4::from_cols_array_2d(&rows).transpose())
    }
}

impl Mul for &ExprMatrix {
    type Output = ExprMatrix;

    fn mul(self, rhs: &ExprMatrix) -> ExprMatrix {
        ExprMatrix(array::from_fn(|i| {
            array::from_fn(|j| {
                Expr::sum((0..4).map(|k| Expr::product([self.0[i][k].clone(), rhs.0[k][j].clone()])))
            })
        }))
    }
}

/// A matrix handed to the formatter
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// Raw floating point transform
    Float(DMat4),
    /// Rounded composition result
    Integer([[i64; 4]; 4]),
    Symbolic(ExprMatrix),
}

/// The standard DH transform, angles in degrees.
///
/// ```text
/// [ cosθ  -sinθ·cosα   sinθ·sinα  a·cosθ ]
/// [ sinθ   cosθ·cosα  -cosθ·sinα  a·sinθ ]
/// [ 0      sinα        cosα       d      ]
/// [ 0      0           0          1      ]
/// ```
pub fn dh_transform(alpha_deg: f64, a: f64, d: f64, theta_deg: f64) -> DMat4 {
    let (sa, ca) = alpha_deg.to_radians().sin_cos();
    let (st, ct) = theta_deg.to_radians().sin_cos();
    // glam matrices are column-major
    DMat4::from_cols(
        DVec4::new(ct, st, 0.0, 0.0),
        DVec4::new(-st * ca, ct * ca, sa, 0.0),
        DVec4::new(st * sa, -ct * sa, ca, 0.0),
        DVec4::new(a * ct, a * st, d, 1.0),
    )
}

/// The same transform over expressions, angles in radians
pub fn dh_transform_expr(alpha: Expr, a: Expr, d: Expr, theta: Expr) -> ExprMatrix {
    let (sa, ca) = (Expr::sin(alpha.clone()), Expr::cos(alpha));
    let (st, ct) = (Expr::sin(theta.clone()), Expr::cos(theta));
    ExprMatrix([
        [
            ct.clone(),
            -(st.clone() * ca.clone()),
            st.clone() * sa.clone(),
            a.clone() * ct.clone(),
        ],
        [st.clone(), ct.clone() * ca.clone(), -(ct * sa.clone()), a * st],
        [Expr::ZERO, sa, ca, d],
        [Expr::ZERO, Expr::ZERO, Expr::ZERO, Expr::ONE],
    ])
}

/// Round half to even, like `numpy.round`
fn round_ties_even(m: &DMat4) -> [[i64; 4]; 4] {
    let rows = m.transpose().to_cols_array_2d();
    rows.map(|row| row.map(|v| v.round_ties_even() as i64))
}

/// The shared kinematics interface of both domains
#[enum_dispatch]
pub trait Kinematics {
    /// One transform per joint, in joint order
    fn joint_transforms(&self) -> Vec<Matrix>;

    /// The finalized product of all joint transforms
    fn compose(&self) -> Matrix;
}

/// One joint with every parameter resolved to a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericJoint {
    pub alpha: f64,
    pub a: f64,
    pub d: f64,
    pub theta: f64,
}

impl NumericJoint {
    pub fn transform(&self) -> DMat4 {
        dh_transform(self.alpha, self.a, self.d, self.theta)
    }
}

/// Joints computed in floating point
#[derive(Debug, Clone, PartialEq)]
pub struct NumericParams {
    pub joints: Vec<NumericJoint>,
}

impl NumericParams {
    /// Resolve every field to a number.
    ///
    /// Expressions are evaluated as constants (angles still in degrees); one
    /// with an unknown fails with [`CalcError::UnboundSymbol`].
    pub fn try_from_params(params: &[JointParams]) -> Result<Self, CalcError> {
        let joints = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let joint = i + 1;
                Ok(NumericJoint {
                    alpha: resolve(joint, FieldName::Alpha, &p.alpha)?,
                    a: resolve(joint, FieldName::A, &p.a)?,
                    d: resolve(joint, FieldName::D, &p.d)?,
                    theta: resolve(joint, FieldName::Theta, &p.theta)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;
        Ok(Self { joints })
    }

    /// The raw product of all transforms, no rounding
    pub fn product(&self) -> DMat4 {
        self.joints
            .iter()
            .fold(DMat4::IDENTITY, |acc, joint| acc * joint.transform())
    }
}

fn resolve(joint: usize, field: FieldName, value: &Field) -> Result<f64, CalcError> {
    match value {
        Field::Literal(v) => Ok(*v),
        Field::Symbol(expr) => match expr.free_symbols().into_iter().next() {
            Some(symbol) => Err(CalcError::UnboundSymbol { joint, field, symbol }),
            None => Ok(expr.eval(&HashMap::new()).unwrap_or(f64::NAN)),
        },
    }
}

impl Kinematics for NumericParams {
    // `i` only feeds the log macros, which compile away without `tracing`
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn joint_transforms(&self) -> Vec<Matrix> {
        self.joints
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let m = joint.transform();
                crate::log::debug!(joint = i + 1, ?m, "numeric transform");
                if !m.is_finite() {
                    crate::log::warn!(joint = i + 1, "transform has non-finite entries");
                }
                Matrix::Float(m)
            })
            .collect()
    }

    fn compose(&self) -> Matrix {
        let product = self.product();
        if !product.is_finite() {
            crate::log::warn!("composed transform has non-finite entries");
        }
        Matrix::Integer(round_ties_even(&product))
    }
}

/// Joints computed over expressions
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicParams {
    pub joints: Vec<JointParams>,
}

impl SymbolicParams {
    pub fn new(params: &[JointParams]) -> Self {
        Self { joints: params.to_vec() }
    }

    /// The unsimplified product of all transforms
    pub fn product(&self) -> ExprMatrix {
        self.transforms()
            .iter()
            .fold(ExprMatrix::identity(), |acc, t| &acc * t)
    }

    fn transforms(&self) -> Vec<ExprMatrix> {
        self.joints
            .iter()
            .map(|p| {
                dh_transform_expr(
                    p.alpha.angle_expr(),
                    p.a.length_expr(),
                    p.d.length_expr(),
                    p.theta.angle_expr(),
                )
            })
            .collect()
    }
}

impl Kinematics for SymbolicParams {
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn joint_transforms(&self) -> Vec<Matrix> {
        self.transforms()
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                crate::log::debug!(joint = i + 1, ?m, "symbolic transform");
                Matrix::Symbolic(m)
            })
            .collect()
    }

    fn compose(&self) -> Matrix {
        // Simplifying after each step keeps the intermediate trees small
        let composed = self
            .transforms()
            .iter()
            .fold(ExprMatrix::identity(), |acc, t| (&acc * t).simplify());
        Matrix::Symbolic(composed.simplify())
    }
}

/// A chain of joints in one of the two domains
#[enum_dispatch(Kinematics)]
#[derive(Debug, Clone, PartialEq)]
pub enum Chain {
    Numeric(NumericParams),
    Symbolic(SymbolicParams),
}

impl Chain {
    /// Build the chain for `domain` from parsed records.
    pub fn new(domain: Domain, params: &[JointParams]) -> Result<Self, CalcError> {
        Ok(match domain {
            Domain::Numeric => Chain::Numeric(NumericParams::try_from_params(params)?),
            Domain::Symbolic => Chain::Symbolic(SymbolicParams::new(params)),
        })
    }

    pub fn domain(&self) -> Domain {
        match self {
            Chain::Numeric(_) => Domain::Numeric,
            Chain::Symbolic(_) => Domain::Symbolic,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Chain::Numeric(p) => p.joints.len(),
            Chain::Symbolic(p) => p.joints.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
