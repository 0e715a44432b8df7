//! Analysis pipeline: lexing and parsing, the two semantic passes, and the
//! five CFG dataflow analyses, wired together the way
//! `original_source/src/pipeline.py`'s `analyze_source` wires its own.

pub mod diagnostics;
pub mod front_end;
pub mod middle_end;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use diagnostics::Diagnostic;

use front_end::ast::Program;
use front_end::parser::parse;
use front_end::program_semantic::ProgramSemanticChecker;
use front_end::semantic::SemanticAnalyzer;
use middle_end::analysis::{always_returns, dead_store, definite_assignment, unreachable, zero_state};
use middle_end::cfg;

#[derive(Clone, Debug, Default)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn report(&self) {
        for d in &self.diagnostics {
            println!("{d}");
        }
    }
}

/// Runs the full pipeline over one file's source text.
///
/// A lex or parse failure halts immediately with a single positionless
/// diagnostic (the message already carries its own `line:column` text). A
/// program-semantic failure (missing/duplicated/malformed `main`) halts
/// before any CFG is built, mirroring the original pipeline's short-circuit.
pub fn analyze_source(source: &str) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    let mut program: Program = match parse(source) {
        Ok(program) => program,
        Err(e) => {
            result.diagnostics.push(Diagnostic::without_pos(e.0));
            return result;
        }
    };

    let sem_errors = SemanticAnalyzer::new().analyze(&mut program);
    result
        .diagnostics
        .extend(sem_errors.into_iter().map(Diagnostic::from));

    let prog_errors = ProgramSemanticChecker::check(&program);
    let prog_errors_present = !prog_errors.is_empty();
    result
        .diagnostics
        .extend(prog_errors.into_iter().map(Diagnostic::from));

    if prog_errors_present {
        return result;
    }

    for func in &program.functions {
        let cfg = cfg::build(&func.body);

        if !always_returns::function_always_returns(&cfg) {
            result.diagnostics.push(Diagnostic::new(
                format!("Function '{}' may not return a value on all paths", func.name),
                func.pos,
            ));
        }

        result.diagnostics.extend(unreachable::check(&cfg));
        result
            .diagnostics
            .extend(definite_assignment::check(&cfg, func));
        result.diagnostics.extend(dead_store::check(&cfg));
        result.diagnostics.extend(zero_state::check(&cfg));
    }

    result
}

pub fn analyze_file(path: &Path) -> io::Result<AnalysisResult> {
    let source = fs::read_to_string(path)?;
    Ok(analyze_source(&source))
}

/// Discovers `.mc` files under `path`: the file itself if `path` names one
/// directly, or every `.mc` file found by a recursive walk, sorted for a
/// stable CLI report order.
pub fn collect_mc_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(if path.extension().is_some_and(|ext| ext == "mc") {
            vec![path.to_path_buf()]
        } else {
            vec![]
        });
    }

    let mut files = vec![];
    walk(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "mc") {
            files.push(path);
        }
    }
    Ok(())
}
