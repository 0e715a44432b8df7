//! The single diagnostic type produced by every phase of the pipeline:
//! lexing, parsing, the two semantic passes, and the five CFG analyses.
//!
//! Equality and ordering are purely positional (see `Diagnostic::cmp`) so a
//! `BTreeSet`/`sort` over diagnostics from different phases still produces a
//! sensible order, even though nothing downstream actually requires one.

use std::fmt;

use crate::front_end::ast::Pos;

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub pos: Option<Pos>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, pos: Pos) -> Self {
        Diagnostic {
            message: message.into(),
            pos: Some(pos),
        }
    }

    pub fn without_pos(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            pos: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{} at {}", self.message, pos),
            None => write!(f, "{}", self.message),
        }
    }
}

impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}
impl Eq for Diagnostic {}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.pos.cmp(&other.pos)
    }
}

impl From<crate::front_end::semantic::SemanticError> for Diagnostic {
    fn from(err: crate::front_end::semantic::SemanticError) -> Self {
        Diagnostic::new(err.message, err.pos)
    }
}
