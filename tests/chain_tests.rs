use std::collections::HashMap;

use dhchain::chain::{NumericParams, SymbolicParams, dh_transform};
use dhchain::{
    CalcError, Domain, FormatOptions, JointParams, Kinematics, Matrix, RawJoint, Request, calculate,
    format_matrix,
};
use glam::DMat4;

fn request(domain: &str, rows: &[[&str; 4]]) -> Request {
    rows.iter().fold(Request::new(rows.len().to_string(), domain), |req, r| {
        req.with_joint(RawJoint::new(r[0], r[1], r[2], r[3]))
    })
}

fn params(rows: &[[&str; 4]]) -> Vec<JointParams> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| JointParams::from_raw(i + 1, &RawJoint::new(r[0], r[1], r[2], r[3])).unwrap())
        .collect()
}

fn rows_of(m: &DMat4) -> [[f64; 4]; 4] {
    m.transpose().to_cols_array_2d()
}

const ARM: [[&str; 4]; 3] = [["90", "0.5", "1", "30"], ["0", "2", "0", "-45"], ["-90", "0", "0.25", "120"]];

#[test]
fn bottom_row_is_fixed_for_every_length() {
    for n in 0..=ARM.len() {
        let numeric = calculate(&request("Numeric", &ARM[..n])).unwrap();
        let Matrix::Integer(m) = numeric.composed else {
            panic!("numeric composition is integer");
        };
        assert_eq!(m[3], [0, 0, 0, 1]);

        let symbolic = calculate(&request("Symbolic", &ARM[..n])).unwrap();
        let text = format_matrix(&symbolic.composed, &FormatOptions::default());
        assert!(text.ends_with("\n [0 0 0 1]]"), "{}", text);
    }
}

#[test]
fn empty_chain_is_identity_in_both_domains() {
    let numeric = calculate(&request("Numeric", &[])).unwrap();
    let symbolic = calculate(&request("Symbolic", &[])).unwrap();
    let identity = "[[1 0 0 0]\n [0 1 0 0]\n [0 0 1 0]\n [0 0 0 1]]";
    assert_eq!(format_matrix(&numeric.composed, &FormatOptions::default()), identity);
    assert_eq!(format_matrix(&symbolic.composed, &FormatOptions::default()), identity);
}

#[test]
fn zero_angles_leave_only_the_link_length() {
    let m = rows_of(&dh_transform(0.0, 1.0, 0.0, 0.0));
    assert_eq!(
        m,
        [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
    );
}

#[test]
fn composition_multiplies_left_to_right() {
    let p = params(&ARM[..2]);
    let t1 = dh_transform(90.0, 0.5, 1.0, 30.0);
    let t2 = dh_transform(0.0, 2.0, 0.0, -45.0);
    let product = NumericParams::try_from_params(&p).unwrap().product();
    assert!(product.abs_diff_eq(t1 * t2, 1e-12));
    assert!(!product.abs_diff_eq(t2 * t1, 1e-6));
}

#[test]
fn numeric_result_is_rounded() {
    let calc = calculate(&request("Numeric", &[["0", "2.6", "0", "0"]])).unwrap();
    let Matrix::Integer(m) = calc.composed else {
        panic!("numeric composition is integer");
    };
    assert_eq!(m[0][3], 3);
}

#[test]
fn intermediate_matrices_truncate() {
    let calc = calculate(&request("Numeric", &[["0", "2.9", "0", "0"]])).unwrap();
    let text = format_matrix(&calc.transforms[0], &FormatOptions::default());
    assert!(text.starts_with("[[1 0 0 2]"), "{}", text);
}

#[test]
fn literal_symbolic_matches_numeric() {
    let p = params(&ARM);
    let numeric = NumericParams::try_from_params(&p).unwrap().product();
    let chain = SymbolicParams::new(&p);
    let Matrix::Symbolic(composed) = chain.compose() else {
        panic!("symbolic composition is symbolic");
    };
    let evaluated = composed.eval(&HashMap::new()).unwrap();
    assert!(evaluated.abs_diff_eq(numeric, 1e-9));
}

#[test]
fn symbolic_chain_evaluates_like_numeric() {
    let p = params(&[["0", "a1", "0", "q1"], ["90", "a2", "d2", "q2"]]);
    let Matrix::Symbolic(composed) = SymbolicParams::new(&p).compose() else {
        panic!("symbolic composition is symbolic");
    };
    let bindings = HashMap::from([
        ("a1".to_string(), 1.5),
        ("a2".to_string(), 0.75),
        ("d2".to_string(), 0.2),
        ("q1".to_string(), 30f64.to_radians()),
        ("q2".to_string(), (-60f64).to_radians()),
    ]);
    let expected = dh_transform(0.0, 1.5, 0.0, 30.0) * dh_transform(90.0, 0.75, 0.2, -60.0);
    assert!(composed.eval(&bindings).unwrap().abs_diff_eq(expected, 1e-9));
}

#[test]
fn scenario_two_joints() {
    let calc = calculate(&request("Numeric", &[["90", "1", "0", "0"], ["0", "1", "0", "90"]])).unwrap();
    let opts = FormatOptions::default();
    let shown: Vec<String> = calc.transforms.iter().map(|m| format_matrix(m, &opts)).collect();
    insta::assert_snapshot!(shown.join("\n\n"), @r"
[[1 0 0 1]
 [0 0 -1 0]
 [0 1 0 0]
 [0 0 0 1]]

[[0 -1 0 0]
 [1 0 0 1]
 [0 0 1 0]
 [0 0 0 1]]
");
    insta::assert_snapshot!(format_matrix(&calc.composed, &opts), @r"
[[0 -1 0 1]
 [0 0 -1 0]
 [1 0 0 1]
 [0 0 0 1]]
");
}

#[test]
fn invalid_joint_count_builds_nothing() {
    let err = calculate(&Request::new("abc", "Numeric")).unwrap_err();
    assert!(matches!(err, CalcError::InvalidJointCount { ref text } if text == "abc"));
}

#[test]
fn symbolic_offsets_in_radians() {
    let calc = calculate(&request("Symbolic", &[["0", "0", "0", "q1+pi/2"]])).unwrap();
    assert_eq!(calc.domain, Domain::Symbolic);
    let text = format_matrix(&calc.composed, &FormatOptions::default());
    assert!(text.starts_with("[[-sin(q1) -cos(q1) 0 0]\n [cos(q1) -sin(q1) 0 0]"), "{}", text);
}

#[test]
fn numeric_domain_evaluates_constant_expressions() {
    let calc = calculate(&request("numeric", &[["0", "sqrt(4)", "0", "180/2"]])).unwrap();
    let Matrix::Integer(m) = calc.composed else {
        panic!("numeric composition is integer");
    };
    assert_eq!(m[1][3], 2);
    assert_eq!(m[0][1], -1);
}

#[test]
fn tiny_link_length_survives_simplification() {
    let calc = calculate(&request("Symbolic", &[["0", "1e-13", "0", "q1"]])).unwrap();
    let text = format_matrix(&calc.composed, &FormatOptions::default());
    assert!(text.starts_with("[[cos(q1) -sin(q1) 0 0.0000000000001000*cos(q1)]"), "{}", text);
}
