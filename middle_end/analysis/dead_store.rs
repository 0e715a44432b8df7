//! Dead-store (liveness) analysis: a write whose value is never read before
//! being overwritten (or the function returns) is dead. Backward may-
//! analysis, live-variables lattice, union join.

use std::collections::BTreeSet as Set;

use crate::middle_end::analysis::{backward_analysis, Diagnostic, Lattice};
use crate::middle_end::cfg::{var_written, vars_read, Cfg};

#[derive(Clone, Debug, Eq, PartialEq)]
struct Live(Set<String>);

impl Lattice for Live {
    fn bottom() -> Self {
        Live(Set::new())
    }

    fn join(&self, other: &Self) -> Self {
        Live(self.0.union(&other.0).cloned().collect())
    }
}

pub fn check(cfg: &Cfg) -> Vec<Diagnostic> {
    let out_facts = backward_analysis(cfg, Live::bottom(), |id, out_fact| {
        let mut live = out_fact.0.clone();
        for stmt in cfg.block(id).statements.iter().rev() {
            if let Some(name) = var_written(stmt) {
                live.remove(name);
            }
            live.extend(vars_read(stmt));
        }
        Live(live)
    });

    let mut diagnostics = vec![];
    for id in cfg.block_ids() {
        let mut live = out_facts[&id].0.clone();
        for stmt in cfg.block(id).statements.iter().rev() {
            if let Some(name) = var_written(stmt) {
                if !live.contains(name) {
                    diagnostics.push(Diagnostic::new("Dead store", stmt.pos()));
                }
                live.remove(name);
            }
            live.extend(vars_read(stmt));
        }
    }

    diagnostics.sort();
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_end::parser::parse;
    use crate::middle_end::cfg::build;
    use pretty_assertions::assert_eq;

    fn diagnostics(src: &str) -> Vec<Diagnostic> {
        let program = parse(src).unwrap();
        let cfg = build(&program.functions[0].body);
        check(&cfg)
    }

    #[test]
    fn flags_a_write_immediately_overwritten() {
        let diags = diagnostics("int main() { int x = 1; x = 2; return x; }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Dead store");
    }

    #[test]
    fn accepts_a_write_that_is_read() {
        let diags = diagnostics("int main() { int x = 1; return x; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn flags_write_never_read_before_function_exit() {
        let diags = diagnostics("int main() { int x = 1; return 0; }");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn accepts_write_read_on_one_loop_iteration_and_overwritten_on_next() {
        let diags = diagnostics(
            "int main() {
                int x = 0;
                int i = 0;
                while (i < 3) {
                    print(x);
                    x = i;
                    i = i + 1;
                }
                return 0;
            }",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn flags_dead_store_in_one_if_branch_but_not_the_other() {
        let diags = diagnostics(
            "int main() {
                int x = 0;
                if (true) {
                    x = 1;
                } else {
                    x = 2;
                    print(x);
                }
                return 0;
            }",
        );
        assert_eq!(diags.len(), 1);
    }
}
