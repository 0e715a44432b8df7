//! Control-flow graph construction.
//!
//! One CFG per function body. Blocks live in a flat arena (`Vec<Block>`)
//! indexed by `BlockId`; edges reference blocks by id instead of owning
//! references, since `while` bodies make the block graph cyclic.

use std::collections::{BTreeMap as Map, BTreeSet as Set};

use crate::front_end::ast::*;

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct BlockId(pub usize);

/// An edge condition: the predicate being tested, and which of its two
/// truth values this edge represents. Fall-through edges have none.
#[derive(Clone, Debug)]
pub struct EdgeCond {
    pub cond: Expr,
    pub assume_true: bool,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub src: BlockId,
    pub dst: BlockId,
    pub cond: Option<EdgeCond>,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    /// debug-only label, e.g. "if_then_3".
    pub label: String,
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Cfg {
    pub entry: BlockId,
    pub exit: BlockId,
    blocks: Vec<Block>,
    succ_edges: Map<BlockId, Vec<Edge>>,
    pred_edges: Map<BlockId, Vec<Edge>>,
}

impl Cfg {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.blocks.len()).map(BlockId)
    }

    pub fn succ(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.succ_edges.get(&id).into_iter().flatten()
    }

    pub fn pred(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.pred_edges.get(&id).into_iter().flatten()
    }

    pub fn succ_ids(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.succ(id).map(|e| e.dst)
    }

    pub fn pred_ids(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.pred(id).map(|e| e.src)
    }
}

pub struct CfgBuilder {
    blocks: Vec<Block>,
    succ_edges: Map<BlockId, Vec<Edge>>,
    pred_edges: Map<BlockId, Vec<Edge>>,
    next_label_id: usize,
    exit: Option<BlockId>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        CfgBuilder {
            blocks: vec![],
            succ_edges: Map::new(),
            pred_edges: Map::new(),
            next_label_id: 0,
            exit: None,
        }
    }

    pub fn build(mut self, body: &Block) -> Cfg {
        let entry = self.new_block("entry");
        let exit = self.new_block("exit");
        self.exit = Some(exit);

        let end = self.build_block(body, entry);
        if let Some(end) = end {
            self.connect(end, exit, None);
        }

        Cfg {
            entry,
            exit,
            blocks: self.blocks,
            succ_edges: self.succ_edges,
            pred_edges: self.pred_edges,
        }
    }

    fn new_block(&mut self, prefix: &str) -> BlockId {
        let id = BlockId(self.blocks.len());
        let label = format!("{prefix}_{}", self.next_label_id);
        self.next_label_id += 1;
        self.blocks.push(Block {
            id,
            label,
            statements: vec![],
        });
        id
    }

    fn connect(&mut self, src: BlockId, dst: BlockId, cond: Option<EdgeCond>) {
        let edge = Edge { src, dst, cond };
        self.succ_edges.entry(src).or_default().push(edge.clone());
        self.pred_edges.entry(dst).or_default().push(edge);
    }

    fn push_stmt(&mut self, block: BlockId, stmt: Stmt) {
        self.blocks[block.0].statements.push(stmt);
    }

    // Returns the block where control falls through to, or `None` if the
    // block's tail is terminated (every path through it ends in `return`).
    //
    // A statement after a terminated tail still has to go somewhere: it
    // gets sunk into a fresh block with no incoming edges, so it shows up
    // in the CFG as unreachable instead of vanishing.
    fn build_block(&mut self, block: &Block, current: BlockId) -> Option<BlockId> {
        let mut current = Some(current);
        for stmt in &block.statements {
            let block_id = current.unwrap_or_else(|| self.new_block("unreachable"));
            current = self.build_stmt(stmt, block_id);
        }
        current
    }

    fn build_stmt(&mut self, stmt: &Stmt, current: BlockId) -> Option<BlockId> {
        match stmt {
            Stmt::VarDecl(_) | Stmt::Assign(_) | Stmt::Print(_) => {
                self.push_stmt(current, stmt.clone());
                Some(current)
            }
            Stmt::Return(_) => {
                self.push_stmt(current, stmt.clone());
                let exit = self.exit.expect("CfgBuilder::build sets exit before walking statements");
                self.connect(current, exit, None);
                None
            }
            Stmt::If(s) => self.build_if(s, current),
            Stmt::While(s) => self.build_while(s, current),
            Stmt::Block(b) => self.build_block(b, current),
        }
    }

    fn build_if(&mut self, stmt: &IfStmt, current: BlockId) -> Option<BlockId> {
        self.push_stmt(current, Stmt::If(stmt.clone()));

        let then_block = self.new_block("if_then");
        let join_block = self.new_block("if_join");

        self.connect(
            current,
            then_block,
            Some(EdgeCond {
                cond: stmt.condition.clone(),
                assume_true: true,
            }),
        );
        let end_then = self.build_block(&stmt.then_body, then_block);

        if let Some(else_body) = &stmt.else_body {
            let else_block = self.new_block("if_else");
            self.connect(
                current,
                else_block,
                Some(EdgeCond {
                    cond: stmt.condition.clone(),
                    assume_true: false,
                }),
            );
            let end_else = self.build_block(else_body, else_block);

            if let Some(end_then) = end_then {
                self.connect(end_then, join_block, None);
            }
            if let Some(end_else) = end_else {
                self.connect(end_else, join_block, None);
            }
        } else {
            self.connect(
                current,
                join_block,
                Some(EdgeCond {
                    cond: stmt.condition.clone(),
                    assume_true: false,
                }),
            );
            if let Some(end_then) = end_then {
                self.connect(end_then, join_block, None);
            }
        }

        Some(join_block)
    }

    fn build_while(&mut self, stmt: &WhileStmt, current: BlockId) -> Option<BlockId> {
        let cond_block = self.new_block("while_cond");
        let body_block = self.new_block("while_body");
        let after_block = self.new_block("while_after");

        self.connect(current, cond_block, None);
        self.push_stmt(cond_block, Stmt::While(stmt.clone()));

        self.connect(
            cond_block,
            body_block,
            Some(EdgeCond {
                cond: stmt.condition.clone(),
                assume_true: true,
            }),
        );
        self.connect(
            cond_block,
            after_block,
            Some(EdgeCond {
                cond: stmt.condition.clone(),
                assume_true: false,
            }),
        );

        let end_body = self.build_block(&stmt.body, body_block);
        if let Some(end_body) = end_body {
            self.connect(end_body, cond_block, None);
        }

        Some(after_block)
    }
}

impl Default for CfgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build(body: &Block) -> Cfg {
    CfgBuilder::new().build(body)
}

// A variable-reference visitor used by both definite-assignment and
// dead-store: the set of names read by one statement, not recursing into
// nested blocks (those are separate CFG blocks).
pub fn vars_read(stmt: &Stmt) -> Set<String> {
    let mut names = Set::new();
    let mut visit = |expr: &Expr| for_each_var_ref(expr, &mut |name| { names.insert(name.to_string()); });
    match stmt {
        Stmt::VarDecl(s) => {
            if let Some(v) = &s.value {
                visit(v);
            }
        }
        Stmt::Assign(s) => visit(&s.value),
        Stmt::Print(s) => visit(&s.value),
        Stmt::Return(s) => visit(&s.value),
        Stmt::If(s) => visit(&s.condition),
        Stmt::While(s) => visit(&s.condition),
        Stmt::Block(_) => {}
    }
    names
}

// The variable written by one statement, if any.
pub fn var_written(stmt: &Stmt) -> Option<&str> {
    match stmt {
        Stmt::Assign(s) => Some(&s.name),
        Stmt::VarDecl(s) if s.value.is_some() => Some(&s.name),
        _ => None,
    }
}
