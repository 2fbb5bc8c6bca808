//! Print the full report for a DH table.
//!
//! `cargo run --example forward --features tracing -- arm.dh`
//! With no argument a built-in two-link planar arm is used.

use miette::IntoDiagnostic;

const DEFAULT_TABLE: &str = "\
# two-link planar arm
domain = Symbolic
0  a1  0  q1
0  a2  0  q2
";

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (name, source) = match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path).into_diagnostic()?;
            (path, source)
        }
        None => ("<builtin>".to_string(), DEFAULT_TABLE.to_string()),
    };

    let request = dhchain::parse_table(&source, &name)?;
    let calc = dhchain::calculate(&request)?;
    print!("{}", calc.report());
    Ok(())
}
