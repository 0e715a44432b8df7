//! Sanity tests for the generic forward/backward drivers, independent of
//! any concrete analysis.

use super::*;
use crate::front_end::parser::parse;
use crate::middle_end::cfg::build;

#[derive(Clone, Debug, Eq, PartialEq)]
struct Reached(bool);

impl Lattice for Reached {
    fn bottom() -> Self {
        Reached(false)
    }
    fn join(&self, other: &Self) -> Self {
        Reached(self.0 || other.0)
    }
}

#[test]
fn forward_analysis_reaches_every_block_in_a_loop() {
    let program = parse(
        "int main() {
            int x = 0;
            while (x < 10) { x = x + 1; }
            return x;
        }",
    )
    .unwrap();
    let cfg = build(&program.functions[0].body);

    let facts = forward_analysis(&cfg, Reached(true), |_, fact| fact.clone());

    for id in cfg.block_ids() {
        assert!(facts[&id].0, "block {id:?} should be reachable");
    }
}

#[test]
fn backward_analysis_reaches_every_block_from_exit() {
    let program = parse(
        "int main() {
            int x = 0;
            if (x < 1) { x = 1; } else { x = 2; }
            return x;
        }",
    )
    .unwrap();
    let cfg = build(&program.functions[0].body);

    let facts = backward_analysis(&cfg, Reached(true), |_, fact| fact.clone());

    for id in cfg.block_ids() {
        assert!(facts[&id].0, "block {id:?} should reach exit");
    }
}
