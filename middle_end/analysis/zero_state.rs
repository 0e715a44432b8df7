//! Zero-state analysis: a shallow abstract interpretation tracking whether
//! each variable is provably zero, provably non-zero, or unknown, used to
//! flag possible division by zero. Forward analysis with per-edge
//! refinement for path sensitivity on direct (and negated) variable
//! conditions.

use std::collections::BTreeMap as Env;

use crate::front_end::ast::{BinOp, Expr, ExprKind, Literal, Stmt, UnOp};
use crate::middle_end::analysis::{forward_analysis_refined, Diagnostic, Lattice};
use crate::middle_end::cfg::{Cfg, Edge};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ZeroState {
    Zero,
    NonZero,
    Unknown,
}

fn join_value(a: ZeroState, b: ZeroState) -> ZeroState {
    if a == b {
        a
    } else {
        ZeroState::Unknown
    }
}

/// `Unvisited` is the join identity (it behaves like "no information yet");
/// `Reached` holds the actual per-variable map once at least one real fact
/// has flowed in. A missing key inside `Reached` means `Unknown`.
#[derive(Clone, Debug, Eq, PartialEq)]
enum EnvState {
    Unvisited,
    Reached(Env<String, ZeroState>),
}

impl EnvState {
    fn materialize(&self) -> Env<String, ZeroState> {
        match self {
            EnvState::Unvisited => Env::new(),
            EnvState::Reached(env) => env.clone(),
        }
    }
}

impl Lattice for EnvState {
    fn bottom() -> Self {
        EnvState::Unvisited
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (EnvState::Unvisited, x) | (x, EnvState::Unvisited) => x.clone(),
            (EnvState::Reached(a), EnvState::Reached(b)) => {
                let mut result = Env::new();
                for key in a.keys().chain(b.keys()) {
                    if result.contains_key(key) {
                        continue;
                    }
                    let va = a.get(key).copied().unwrap_or(ZeroState::Unknown);
                    let vb = b.get(key).copied().unwrap_or(ZeroState::Unknown);
                    result.insert(key.clone(), join_value(va, vb));
                }
                EnvState::Reached(result)
            }
        }
    }
}

fn eval_expr(expr: &Expr, state: &Env<String, ZeroState>) -> ZeroState {
    match &expr.kind {
        // a boolean literal counts as its numeric value (`false` is 0), the
        // same coercion the source language applies when a bool flows into
        // an arithmetic context.
        ExprKind::Literal(Literal::Int(0)) => ZeroState::Zero,
        ExprKind::Literal(Literal::Int(_)) => ZeroState::NonZero,
        ExprKind::Literal(Literal::Bool(false)) => ZeroState::Zero,
        ExprKind::Literal(Literal::Bool(true)) => ZeroState::NonZero,
        ExprKind::Var(name) => state.get(name).copied().unwrap_or(ZeroState::Unknown),
        _ => ZeroState::Unknown,
    }
}

fn apply_stmt(stmt: &Stmt, state: &mut Env<String, ZeroState>) {
    match stmt {
        Stmt::Assign(s) => {
            let value = eval_expr(&s.value, state);
            state.insert(s.name.clone(), value);
        }
        Stmt::VarDecl(s) => {
            let value = match &s.value {
                Some(v) => eval_expr(v, state),
                None => ZeroState::Unknown,
            };
            state.insert(s.name.clone(), value);
        }
        _ => {}
    }
}

// Extracts `(variable name, polarity asserted on the true edge)` from a
// condition expression directly or negated-directly referencing a variable.
fn direct_var_condition(cond: &Expr) -> Option<(&str, bool)> {
    match &cond.kind {
        ExprKind::Var(name) => Some((name, true)),
        ExprKind::Unary(UnOp::Not, inner) => {
            direct_var_condition(inner).map(|(name, polarity)| (name, !polarity))
        }
        _ => None,
    }
}

fn refine(edge: &Edge, fact: &EnvState) -> EnvState {
    let Some(edge_cond) = &edge.cond else {
        return fact.clone();
    };
    let Some((name, true_polarity)) = direct_var_condition(&edge_cond.cond) else {
        return fact.clone();
    };

    let mut refined = fact.materialize();
    let asserted = true_polarity == edge_cond.assume_true;
    refined.insert(
        name.to_string(),
        if asserted {
            ZeroState::NonZero
        } else {
            ZeroState::Zero
        },
    );
    EnvState::Reached(refined)
}

fn transfer(cfg: &Cfg, id: crate::middle_end::cfg::BlockId, in_fact: &EnvState) -> EnvState {
    let mut state = in_fact.materialize();
    for stmt in &cfg.block(id).statements {
        apply_stmt(stmt, &mut state);
    }
    EnvState::Reached(state)
}

pub fn check(cfg: &Cfg) -> Vec<Diagnostic> {
    let facts = forward_analysis_refined(
        cfg,
        EnvState::Reached(Env::new()),
        |id, in_fact| transfer(cfg, id, in_fact),
        refine,
    );

    let mut diagnostics = vec![];
    for id in cfg.block_ids() {
        let mut state = facts[&id].materialize();
        for stmt in &cfg.block(id).statements {
            check_stmt(stmt, &state, &mut diagnostics);
            apply_stmt(stmt, &mut state);
        }
    }
    diagnostics
}

fn check_stmt(stmt: &Stmt, state: &Env<String, ZeroState>, diagnostics: &mut Vec<Diagnostic>) {
    match stmt {
        Stmt::Assign(s) => check_expr(&s.value, state, diagnostics),
        Stmt::VarDecl(s) => {
            if let Some(v) = &s.value {
                check_expr(v, state, diagnostics);
            }
        }
        Stmt::Print(s) => check_expr(&s.value, state, diagnostics),
        Stmt::Return(s) => check_expr(&s.value, state, diagnostics),
        Stmt::If(_) | Stmt::While(_) | Stmt::Block(_) => {}
    }
}

fn check_expr(expr: &Expr, state: &Env<String, ZeroState>, diagnostics: &mut Vec<Diagnostic>) {
    match &expr.kind {
        ExprKind::Binary(left, BinOp::Div, right) => {
            if let ExprKind::Var(name) = &right.kind {
                let value = state.get(name).copied().unwrap_or(ZeroState::Unknown);
                if value != ZeroState::NonZero {
                    diagnostics.push(Diagnostic::new("Possible division by zero", expr.pos));
                }
            }
            check_expr(left, state, diagnostics);
            check_expr(right, state, diagnostics);
        }
        ExprKind::Binary(left, _, right) => {
            check_expr(left, state, diagnostics);
            check_expr(right, state, diagnostics);
        }
        ExprKind::Unary(_, operand) => check_expr(operand, state, diagnostics),
        ExprKind::Call(_, args) => {
            for arg in args {
                check_expr(arg, state, diagnostics);
            }
        }
        ExprKind::Literal(_) | ExprKind::Var(_) => {}
    }
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
    fn flags_division_by_an_unknown_variable() {
        let diags = diagnostics("int main() { int x = f(); return 10 / x; }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Possible division by zero");
    }

    #[test]
    fn accepts_division_by_a_nonzero_literal() {
        let diags = diagnostics("int main() { return 10 / 2; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn flags_division_by_a_variable_known_zero() {
        let diags = diagnostics("int main() { int x = 0; return 10 / x; }");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn accepts_division_guarded_by_a_direct_variable_check() {
        let diags = diagnostics(
            "int main() {
                int x = f();
                if (x) { return 10 / x; }
                return 0;
            }",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn accepts_division_guarded_by_a_negated_variable_check() {
        let diags = diagnostics(
            "int main() {
                int x = f();
                if (!x) { return 0; }
                return 10 / x;
            }",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn flags_division_on_the_branch_where_the_guard_proves_zero() {
        let diags = diagnostics(
            "int main() {
                int x = f();
                if (x) {
                    return 0;
                } else {
                    return 10 / x;
                }
            }",
        );
        assert_eq!(diags.len(), 1, "{diags:?}");
    }
}
