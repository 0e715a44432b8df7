//! Unreachable-code analysis: any block not reachable from `entry` is dead,
//! because the CFG builder never prunes a block once created — a `return`
//! simply drops the fall-through edge, leaving whatever follows it
//! predecessor-less.

use std::collections::BTreeSet as Set;

use crate::middle_end::analysis::Diagnostic;
use crate::middle_end::cfg::{BlockId, Cfg};

pub fn reachable_blocks(cfg: &Cfg) -> Set<BlockId> {
    let mut visited = Set::new();
    dfs(cfg, cfg.entry, &mut visited);
    visited
}

fn dfs(cfg: &Cfg, block: BlockId, visited: &mut Set<BlockId>) {
    if !visited.insert(block) {
        return;
    }
    for succ in cfg.succ_ids(block) {
        dfs(cfg, succ, visited);
    }
}

pub fn unreachable_blocks(cfg: &Cfg) -> Set<BlockId> {
    let reachable = reachable_blocks(cfg);
    cfg.block_ids().filter(|id| !reachable.contains(id)).collect()
}

pub fn check(cfg: &Cfg) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];
    for id in unreachable_blocks(cfg) {
        for stmt in &cfg.block(id).statements {
            diagnostics.push(Diagnostic::new("Unreachable code", stmt.pos()));
        }
    }
    diagnostics
}
