//! Always-returns analysis: does every path from `entry` hit a `return`
//! before reaching `exit`?
//!
//! Plain reachability search, not a fixed-point analysis, so it doesn't go
//! through `forward_analysis`/`backward_analysis`.

use std::collections::BTreeSet as Set;

use crate::front_end::ast::Stmt;
use crate::middle_end::cfg::{BlockId, Cfg};

/// `true` if every control path through `cfg` passes through a `return`
/// before reaching `exit`.
pub fn function_always_returns(cfg: &Cfg) -> bool {
    let return_blocks = find_return_blocks(cfg);
    let mut visited = Set::new();
    !can_reach_exit(cfg, cfg.entry, &return_blocks, &mut visited)
}

fn find_return_blocks(cfg: &Cfg) -> Set<BlockId> {
    cfg.blocks()
        .iter()
        .filter(|b| matches!(b.statements.last(), Some(Stmt::Return(_))))
        .map(|b| b.id)
        .collect()
}

fn can_reach_exit(cfg: &Cfg, current: BlockId, return_blocks: &Set<BlockId>, visited: &mut Set<BlockId>) -> bool {
    if current == cfg.exit {
        return true;
    }
    if !visited.insert(current) {
        return false;
    }
    if return_blocks.contains(&current) {
        return false;
    }

    cfg.succ_ids(current)
        .any(|succ| can_reach_exit(cfg, succ, return_blocks, visited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_end::parser::parse;
    use crate::middle_end::cfg::build;

    fn always_returns(src: &str) -> bool {
        let program = parse(src).unwrap();
        let cfg = build(&program.functions[0].body);
        function_always_returns(&cfg)
    }

    #[test]
    fn straight_line_return_always_returns() {
        assert!(always_returns("int main() { return 0; }"));
    }

    #[test]
    fn if_without_else_may_not_return() {
        assert!(!always_returns(
            "int main() { if (true) { return 1; } }"
        ));
    }

    #[test]
    fn if_else_both_returning_always_returns() {
        assert!(always_returns(
            "int main() { if (true) { return 1; } else { return 2; } }"
        ));
    }

    #[test]
    fn while_loop_with_trailing_return_always_returns() {
        assert!(always_returns(
            "int main() {
                int x = 0;
                while (x < 10) { x = x + 1; }
                return x;
            }"
        ));
    }

    #[test]
    fn return_only_inside_loop_body_may_not_return() {
        assert!(!always_returns(
            "int main() {
                while (true) { return 1; }
            }"
        ));
    }
}
