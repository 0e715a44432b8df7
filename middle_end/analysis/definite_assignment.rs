//! Definite-assignment analysis: every variable read must be on every path
//! that reaches the read. Forward must-analysis (intersection join) over
//! sets of assigned names.

use std::collections::BTreeSet as Set;

use crate::front_end::ast::{Block, FunctionDef, Stmt};
use crate::middle_end::analysis::{forward_analysis, Diagnostic, Lattice};
use crate::middle_end::cfg::{var_written, vars_read, Cfg};

/// The must-analysis lattice: `Universe` is the join identity (it behaves
/// like "all names are assigned" under intersection), `Known` holds the
/// actual set once at least one real fact has flowed in.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Assigned {
    Universe,
    Known(Set<String>),
}

impl Assigned {
    fn materialize(&self, universe: &Set<String>) -> Set<String> {
        match self {
            Assigned::Universe => universe.clone(),
            Assigned::Known(names) => names.clone(),
        }
    }
}

impl Lattice for Assigned {
    fn bottom() -> Self {
        Assigned::Universe
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Assigned::Universe, x) | (x, Assigned::Universe) => x.clone(),
            (Assigned::Known(a), Assigned::Known(b)) => {
                Assigned::Known(a.intersection(b).cloned().collect())
            }
        }
    }
}

fn collect_declared_names(block: &Block, names: &mut Set<String>) {
    for stmt in &block.statements {
        match stmt {
            Stmt::VarDecl(decl) => {
                names.insert(decl.name.clone());
            }
            Stmt::If(s) => {
                collect_declared_names(&s.then_body, names);
                if let Some(else_body) = &s.else_body {
                    collect_declared_names(else_body, names);
                }
            }
            Stmt::While(s) => collect_declared_names(&s.body, names),
            Stmt::Block(b) => collect_declared_names(b, names),
            Stmt::Assign(_) | Stmt::Return(_) | Stmt::Print(_) => {}
        }
    }
}

pub fn check(cfg: &Cfg, func: &FunctionDef) -> Vec<Diagnostic> {
    let mut universe: Set<String> = func.params.iter().map(|p| p.name.clone()).collect();
    collect_declared_names(&func.body, &mut universe);

    let entry_state = Assigned::Known(func.params.iter().map(|p| p.name.clone()).collect());

    let facts = forward_analysis(cfg, entry_state, |id, in_fact| {
        let mut assigned = in_fact.materialize(&universe);
        for stmt in &cfg.block(id).statements {
            if let Some(name) = var_written(stmt) {
                assigned.insert(name.to_string());
            }
        }
        Assigned::Known(assigned)
    });

    let mut diagnostics = vec![];
    for id in cfg.block_ids() {
        let mut running = facts[&id].materialize(&universe);
        for stmt in &cfg.block(id).statements {
            for name in vars_read(stmt) {
                if !running.contains(&name) {
                    diagnostics.push(Diagnostic::new(
                        format!("Variable '{name}' may be unassigned"),
                        stmt.pos(),
                    ));
                }
            }
            if let Some(name) = var_written(stmt) {
                running.insert(name.to_string());
            }
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_end::parser::parse;
    use crate::middle_end::cfg::build;

    fn diagnostics(src: &str) -> Vec<Diagnostic> {
        let program = parse(src).unwrap();
        let cfg = build(&program.functions[0].body);
        check(&cfg, &program.functions[0])
    }

    #[test]
    fn flags_use_before_assignment_on_some_path() {
        let diags = diagnostics(
            "int main() {
                int x;
                if (true) { x = 1; }
                return x;
            }",
        );
        assert!(diags.iter().any(|d| d.message.contains("'x'")));
    }

    #[test]
    fn accepts_assignment_on_every_path() {
        let diags = diagnostics(
            "int main() {
                int x;
                if (true) { x = 1; } else { x = 2; }
                return x;
            }",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn accepts_initialized_declaration() {
        let diags = diagnostics("int main() { int x = 0; return x; }");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn params_are_assigned_at_entry() {
        let program = parse("int f(int x) { return x; } int main() { return f(0); }").unwrap();
        let cfg = build(&program.functions[0].body);
        let diags = check(&cfg, &program.functions[0]);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn flags_use_of_never_assigned_variable_in_a_loop() {
        let diags = diagnostics(
            "int main() {
                int x;
                int i = 0;
                while (i < 3) {
                    print(x);
                    x = i;
                    i = i + 1;
                }
                return 0;
            }",
        );
        assert!(diags.iter().any(|d| d.message.contains("'x'")));
    }
}
