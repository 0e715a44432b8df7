//! Program-level semantic check: exactly one `main`, with the right shape.
//!
//! Kept as its own pass, separate from `semantic::SemanticAnalyzer`, because
//! it is the gate that decides whether CFG analysis runs at all — a missing
//! or duplicated `main` halts the pipeline before any function gets a CFG.

use super::ast::{Pos, Program, Type};
use super::semantic::SemanticError;

pub struct ProgramSemanticChecker;

impl ProgramSemanticChecker {
    pub fn check(program: &Program) -> Vec<SemanticError> {
        let mains: Vec<_> = program
            .functions
            .iter()
            .filter(|f| f.name == "main")
            .collect();

        if mains.is_empty() {
            return vec![SemanticError {
                message: "Missing entry function 'main'".to_string(),
                pos: Pos::default(),
            }];
        }

        if mains.len() > 1 {
            return mains
                .iter()
                .map(|f| SemanticError {
                    message: "Multiple definitions of 'main'".to_string(),
                    pos: f.pos,
                })
                .collect();
        }

        let main_fn = mains[0];
        let mut errors = vec![];

        if main_fn.return_type != Type::Int {
            errors.push(SemanticError {
                message: "Function 'main' must return int".to_string(),
                pos: main_fn.pos,
            });
        }

        if !main_fn.params.is_empty() {
            errors.push(SemanticError {
                message: "Function 'main' must take no parameters".to_string(),
                pos: main_fn.pos,
            });
        }

        errors
    }
}
