//! Dataflow analysis framework shared by the three fixed-point analyses
//! (definite-assignment, dead-store, zero-state). Always-returns and
//! unreachable-code are plain graph searches and live in their own modules
//! without going through this driver.

#![allow(dead_code)]

use std::collections::{BTreeMap as Map, VecDeque};

use super::cfg::{BlockId, Cfg, Edge};

pub use crate::diagnostics::Diagnostic;

pub mod always_returns;
pub mod dead_store;
pub mod definite_assignment;
pub mod unreachable;
pub mod zero_state;

#[cfg(test)]
mod tests;

/// A join semi-lattice value used as a per-block dataflow fact.
pub trait Lattice: Clone + Eq {
    fn bottom() -> Self;
    fn join(&self, other: &Self) -> Self;
}

/// Runs `transfer` to a fixed point over `cfg`, starting from `entry_state`
/// at `cfg.entry` and `L::bottom()` everywhere else, following successor
/// edges. Returns the `IN` fact for every block.
///
/// Mirrors the teacher's `forward_analysis` worklist shape: a `VecDeque`
/// seeded with the entry block, draining until no block's `IN` changes.
pub fn forward_analysis<L: Lattice>(
    cfg: &Cfg,
    entry_state: L,
    transfer: impl Fn(BlockId, &L) -> L,
) -> Map<BlockId, L> {
    let mut in_facts: Map<BlockId, L> = cfg.block_ids().map(|id| (id, L::bottom())).collect();
    in_facts.insert(cfg.entry, entry_state);

    let mut worklist: VecDeque<BlockId> = VecDeque::new();
    worklist.push_back(cfg.entry);

    while let Some(block) = worklist.pop_front() {
        let in_fact = in_facts[&block].clone();
        let out_fact = transfer(block, &in_fact);

        for edge in cfg.succ(block) {
            let succ = edge.dst;
            let joined = in_facts[&succ].join(&out_fact);
            if in_facts[&succ] != joined {
                in_facts.insert(succ, joined);
                worklist.push_back(succ);
            }
        }
    }

    in_facts
}

/// Like `forward_analysis`, but `refine` runs on each edge's source fact
/// before it's joined into the destination — the hook zero-state analysis
/// needs to narrow a variable's state along a branch's true/false edge.
pub fn forward_analysis_refined<L: Lattice>(
    cfg: &Cfg,
    entry_state: L,
    transfer: impl Fn(BlockId, &L) -> L,
    refine: impl Fn(&Edge, &L) -> L,
) -> Map<BlockId, L> {
    let mut in_facts: Map<BlockId, L> = cfg.block_ids().map(|id| (id, L::bottom())).collect();
    in_facts.insert(cfg.entry, entry_state);

    let mut worklist: VecDeque<BlockId> = VecDeque::new();
    worklist.push_back(cfg.entry);

    while let Some(block) = worklist.pop_front() {
        let in_fact = in_facts[&block].clone();
        let out_fact = transfer(block, &in_fact);

        for edge in cfg.succ(block) {
            let succ = edge.dst;
            let refined = refine(edge, &out_fact);
            let joined = in_facts[&succ].join(&refined);
            if in_facts[&succ] != joined {
                in_facts.insert(succ, joined);
                worklist.push_back(succ);
            }
        }
    }

    in_facts
}

/// Backward counterpart of `forward_analysis`: seeds `cfg.exit` with
/// `exit_state` and walks predecessor edges, computing the `OUT` fact for
/// every block (the join of its successors' `IN` facts).
pub fn backward_analysis<L: Lattice>(
    cfg: &Cfg,
    exit_state: L,
    transfer: impl Fn(BlockId, &L) -> L,
) -> Map<BlockId, L> {
    let mut out_facts: Map<BlockId, L> = cfg.block_ids().map(|id| (id, L::bottom())).collect();
    out_facts.insert(cfg.exit, exit_state);

    let mut worklist: VecDeque<BlockId> = VecDeque::new();
    worklist.push_back(cfg.exit);

    while let Some(block) = worklist.pop_front() {
        let out_fact = out_facts[&block].clone();
        let in_fact = transfer(block, &out_fact);

        for edge in cfg.pred(block) {
            let pred = edge.src;
            let joined = out_facts[&pred].join(&in_fact);
            if out_facts[&pred] != joined {
                out_facts.insert(pred, joined);
                worklist.push_back(pred);
            }
        }
    }

    out_facts
}

