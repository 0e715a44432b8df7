//! Runs every `.mc` fixture under `tests/fixtures` through the pipeline and
//! checks its `// EXPECT:` directives, mirroring
//! `original_source/tests/diagnostics/run_diagnostics.py`'s substring
//! matcher: every expected string must appear in some diagnostic, and every
//! diagnostic must match some expected string. `// EXPECT: OK` asserts zero
//! diagnostics. A fixture with no directives is a test-spec error.

use std::fs;
use std::path::Path;

use mc_analyzer::analyze_source;

fn extract_expectations(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("// EXPECT:"))
        .map(|rest| rest.trim().to_string())
        .collect()
}

fn run_fixture(path: &Path) {
    let source = fs::read_to_string(path).expect("fixture must be readable");
    let expected = extract_expectations(&source);
    assert!(
        !expected.is_empty(),
        "{}: no EXPECT directives found",
        path.display()
    );

    let result = analyze_source(&source);
    let actual: Vec<String> = result.diagnostics.iter().map(|d| d.to_string()).collect();

    if expected == ["OK"] {
        assert!(
            actual.is_empty(),
            "{}: expected no diagnostics, got {actual:?}",
            path.display()
        );
        return;
    }

    let expected_lower: Vec<String> = expected.iter().map(|e| e.to_lowercase()).collect();
    let actual_lower: Vec<String> = actual.iter().map(|a| a.to_lowercase()).collect();

    let missing: Vec<&String> = expected
        .iter()
        .zip(&expected_lower)
        .filter(|(_, e)| !actual_lower.iter().any(|a| a.contains(e.as_str())))
        .map(|(orig, _)| orig)
        .collect();

    let unexpected: Vec<&String> = actual
        .iter()
        .zip(&actual_lower)
        .filter(|(_, a)| !expected_lower.iter().any(|e| a.contains(e.as_str())))
        .map(|(orig, _)| orig)
        .collect();

    assert!(
        missing.is_empty() && unexpected.is_empty(),
        "{}: missing={missing:?} unexpected={unexpected:?}",
        path.display()
    );
}

#[test]
fn fixtures_match_their_expect_directives() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut count = 0;
    for entry in fs::read_dir(&dir).expect("fixtures directory must exist") {
        let entry = entry.expect("directory entry must be readable");
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "mc") {
            run_fixture(&path);
            count += 1;
        }
    }
    assert!(count > 0, "no .mc fixtures found under {}", dir.display());
}
