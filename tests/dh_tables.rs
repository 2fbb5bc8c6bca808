use camino::Utf8Path;
use dhchain::{FormatOptions, calculate, format_matrix, parse_table};

/// Format a colored inline diff using dissimilar
fn format_inline_diff(expected: &str, actual: &str) -> String {
    use dissimilar::Chunk;

    let mut output = String::new();
    output.push_str("\n=== Inline Diff (expected vs actual) ===\n");
    output.push_str("Legend: [-expected only-] [+actual only+] [unchanged]\n\n");

    for chunk in dissimilar::diff(expected, actual) {
        match chunk {
            Chunk::Equal(s) => output.push_str(s),
            Chunk::Delete(s) => {
                output.push_str("\x1b[31m[-");
                output.push_str(s);
                output.push_str("-]\x1b[0m");
            }
            Chunk::Insert(s) => {
                output.push_str("\x1b[32m[+");
                output.push_str(s);
                output.push_str("+]\x1b[0m");
            }
        }
    }

    output
}

fn test_dh_table(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let expected = std::fs::read_to_string(path.with_extension("out"))?;

    let request = parse_table(&source, path.as_str())?;
    let calc = calculate(&request)?;
    let actual = format_matrix(&calc.composed, &FormatOptions::default());

    if actual.trim_end() != expected.trim_end() {
        panic!(
            "final matrix mismatch for {}:\n{}",
            path,
            format_inline_diff(expected.trim_end(), actual.trim_end())
        );
    }

    Ok(())
}

datatest_stable::harness! {
    { test = test_dh_table, root = "tests/tables", pattern = r"\.dh$" },
}
