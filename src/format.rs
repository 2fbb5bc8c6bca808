//! Text rendering of matrices and whole calculation reports

use std::fmt;

use glam::DMat4;

use crate::{Calculation, Matrix};
use crate::expr::{Expr, simplify};
use crate::params::FieldName;

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Significant digits for non-integer constants in symbolic entries
    pub significant_digits: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            significant_digits: 4,
        }
    }
}

/// Render one matrix as `[[a b c d]\n [e f g h]\n [i j k l]\n [m n o p]]`.
pub fn format_matrix(matrix: &Matrix, options: &FormatOptions) -> String {
    let cells: [[String; 4]; 4] = match matrix {
        Matrix::Float(m) => float_rows(m).map(|row| row.map(format_float)),
        Matrix::Integer(rows) => rows.map(|row| row.map(|v| v.to_string())),
        Matrix::Symbolic(m) => m
            .rows()
            .clone()
            .map(|row| row.map(|e| format_expr(&e, options))),
    };

    let mut out = String::from("[");
    for (i, row) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("\n ");
        }
        out.push('[');
        out.push_str(&row.join(" "));
        out.push(']');
    }
    out.push(']');
    out
}

fn float_rows(m: &DMat4) -> [[f64; 4]; 4] {
    m.transpose().to_cols_array_2d()
}

/// Truncate toward zero; non-finite values print as themselves
fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // `as` saturates out-of-range values
    (value.trunc() as i64).to_string()
}

fn format_expr(expr: &Expr, options: &FormatOptions) -> String {
    let simplified = simplify(expr);
    match simplified.as_integer() {
        Some(n) => n.to_string(),
        None => simplified
            .evaluate_to_fixed(options.significant_digits)
            .to_string(),
    }
}

/// The full session text: parameter table, every joint transform, and the
/// composed transform.
pub struct Report<'a> {
    calculation: &'a Calculation,
    options: FormatOptions,
}

impl<'a> Report<'a> {
    pub fn new(calculation: &'a Calculation) -> Self {
        Self {
            calculation,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    fn parameter_table(&self) -> String {
        let mut rows: Vec<[String; 5]> = vec![[
            "Joint".to_string(),
            "Alpha".to_string(),
            "A".to_string(),
            "D".to_string(),
            "Theta".to_string(),
        ]];
        for (i, params) in self.calculation.params.iter().enumerate() {
            let [alpha, a, d, theta] = FieldName::ALL.map(|name| params.field(name).to_string());
            rows.push([(i + 1).to_string(), alpha, a, d, theta]);
        }

        let mut widths = [0usize; 5];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &rows {
            let mut line = String::new();
            for (cell, w) in row.iter().zip(widths) {
                line.push_str(&format!("{:<width$}  ", cell, width = w));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calc = self.calculation;
        writeln!(f, "Parameter Type: {}", calc.domain)?;
        writeln!(f)?;
        f.write_str(&self.parameter_table())?;
        writeln!(f)?;
        writeln!(f, "Intermediate Matrices:")?;
        writeln!(f)?;
        for (i, m) in calc.transforms.iter().enumerate() {
            writeln!(f, "DH Matrix for Joint {}:", i + 1)?;
            writeln!(f, "{}", format_matrix(m, &self.options))?;
            writeln!(f)?;
        }
        writeln!(f, "Final DH Matrix:")?;
        writeln!(f)?;
        writeln!(f, "{}", format_matrix(&calc.composed, &self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ExprMatrix, dh_transform};

    #[test]
    fn float_entries_truncate() {
        let m = DMat4::from_cols_array_2d(&[
            [2.9, 0.0, 0.0, 0.0],
            [0.0, -0.7, 0.0, 0.0],
            [0.0, 0.0, -2.9, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        insta::assert_snapshot!(format_matrix(&Matrix::Float(m), &FormatOptions::default()), @r"
[[2 0 0 0]
 [0 0 0 0]
 [0 0 -2 0]
 [0 0 0 1]]
");
    }

    #[test]
    fn non_finite_entries() {
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn right_angle_twist_prints_as_integers() {
        let m = Matrix::Float(dh_transform(90.0, 1.0, 0.0, 0.0));
        insta::assert_snapshot!(format_matrix(&m, &FormatOptions::default()), @r"
[[1 0 0 1]
 [0 0 -1 0]
 [0 1 0 0]
 [0 0 0 1]]
");
    }

    #[test]
    fn integer_matrix() {
        let m = Matrix::Integer([[1, 0, 0, 3], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]);
        assert_eq!(
            format_matrix(&m, &FormatOptions::default()),
            "[[1 0 0 3]\n [0 1 0 0]\n [0 0 1 0]\n [0 0 0 1]]"
        );
    }

    #[test]
    fn symbolic_entries() {
        let mut m = ExprMatrix::identity();
        m.0[0][0] = Expr::cos(Expr::sym("q1"));
        m.0[0][1] = Expr::cos(Expr::degrees(45.0));
        m.0[0][3] = Expr::sym("a") * Expr::Num(0.5);
        m.0[1][1] = Expr::pow(Expr::sin(Expr::sym("x")), Expr::Num(2.0))
            + Expr::pow(Expr::cos(Expr::sym("x")), Expr::Num(2.0));
        let text = format_matrix(&Matrix::Symbolic(m), &FormatOptions::default());
        assert_eq!(
            text,
            "[[cos(q1) 0.7071 0 0.5000*a]\n [0 1 0 0]\n [0 0 1 0]\n [0 0 0 1]]"
        );
    }

    #[test]
    fn significant_digits_are_configurable() {
        let mut m = ExprMatrix::identity();
        m.0[0][1] = Expr::Pi * Expr::sym("r");
        let options = FormatOptions { significant_digits: 6 };
        assert!(format_matrix(&Matrix::Symbolic(m), &options).starts_with("[[1 3.14159*r 0 0]"));
    }
}
