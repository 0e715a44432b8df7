//! Local semantic checking: scoping, redeclaration, and type inference.
//!
//! Walks the AST exactly once, threading a `ScopeStack` the way the teacher's
//! validator threads its own scope chain, and writes `Expr::inferred_type`
//! as it goes so everything downstream can call `Expr::typ()` without
//! panicking.

use std::collections::HashMap;
use std::fmt;

use super::ast::*;

// SECTION: diagnostics

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SemanticError {
    pub message: String,
    pub pos: Pos,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.pos)
    }
}

// SECTION: symbols and scopes

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SymbolKind {
    Var,
    Func,
    Param,
}

#[derive(Clone, Copy, Debug)]
struct Symbol {
    kind: SymbolKind,
    typ: Type,
}

#[derive(Default)]
struct Scope {
    symbols: HashMap<String, Symbol>,
}

#[derive(Default)]
struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop(&mut self) {
        self.scopes.pop().expect("no scope to pop");
    }

    fn define(&mut self, name: &str, sym: Symbol) {
        self.scopes
            .last_mut()
            .expect("no active scope")
            .symbols
            .insert(name.to_string(), sym);
    }

    fn lookup_current(&self, name: &str) -> Option<Symbol> {
        self.scopes.last()?.symbols.get(name).copied()
    }

    fn lookup(&self, name: &str) -> Option<Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name).copied())
    }
}

// SECTION: analyzer

pub struct SemanticAnalyzer {
    scopes: ScopeStack,
    errors: Vec<SemanticError>,
    current_function_return_type: Option<Type>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            scopes: ScopeStack::default(),
            errors: vec![],
            current_function_return_type: None,
        }
    }

    pub fn analyze(mut self, program: &mut Program) -> Vec<SemanticError> {
        self.scopes.push();
        self.visit_program(program);
        self.scopes.pop();
        self.errors
    }

    fn error(&mut self, message: impl Into<String>, pos: Pos) {
        self.errors.push(SemanticError {
            message: message.into(),
            pos,
        });
    }

    // SECTION: program / functions

    fn visit_program(&mut self, program: &mut Program) {
        // pass 1: declare every function before analyzing any body, so
        // forward and mutually recursive calls resolve.
        for func in &program.functions {
            self.declare_function(func);
        }

        for func in &mut program.functions {
            self.visit_function(func);
        }
    }

    fn declare_function(&mut self, func: &FunctionDef) {
        if self.scopes.lookup_current(&func.name).is_some() {
            self.errors.push(SemanticError {
                message: format!("Redeclaration of function '{}'", func.name),
                pos: func.pos,
            });
            return;
        }

        self.scopes.define(
            &func.name,
            Symbol {
                kind: SymbolKind::Func,
                typ: func.return_type,
            },
        );
    }

    fn visit_function(&mut self, func: &mut FunctionDef) {
        self.scopes.push();
        let old_ret = self.current_function_return_type.replace(func.return_type);

        for param in &func.params {
            if self.scopes.lookup_current(&param.name).is_some() {
                self.error(
                    format!("Redeclaration of parameter '{}'", param.name),
                    param.pos,
                );
            } else {
                self.scopes.define(
                    &param.name,
                    Symbol {
                        kind: SymbolKind::Param,
                        typ: param.typ,
                    },
                );
            }
        }

        self.visit_block(&mut func.body);

        self.current_function_return_type = old_ret;
        self.scopes.pop();
    }

    // SECTION: blocks / statements

    // Unreachable code is the CFG-based unreachable-code analysis's job
    // (it sees unreachability across block boundaries, not just trailing
    // statements in one block); this pass still visits every statement so
    // type inference runs on the whole tree.
    fn visit_block(&mut self, block: &mut Block) {
        self.scopes.push();

        for stmt in &mut block.statements {
            self.visit_stmt(stmt);
        }

        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::VarDecl(s) => self.visit_var_decl(s),
            Stmt::Assign(s) => self.visit_assign(s),
            Stmt::If(s) => self.visit_if(s),
            Stmt::While(s) => self.visit_while(s),
            Stmt::Return(s) => self.visit_return(s),
            Stmt::Print(s) => self.visit_print(s),
            Stmt::Block(b) => self.visit_block(b),
        }
    }

    fn visit_var_decl(&mut self, decl: &mut VarDecl) {
        let sym = if self.scopes.lookup_current(&decl.name).is_some() {
            self.error(format!("Redeclaration of variable '{}'", decl.name), decl.pos);
            None
        } else {
            let sym = Symbol {
                kind: SymbolKind::Var,
                typ: decl.typ,
            };
            self.scopes.define(&decl.name, sym);
            Some(sym)
        };

        if let Some(value) = &mut decl.value {
            self.visit_expr(value);

            if let Some(sym) = sym {
                if value.typ() != sym.typ {
                    self.error(
                        format!(
                            "Type mismatch in initialization of '{}' (expected {}, got {})",
                            decl.name,
                            sym.typ,
                            value.typ()
                        ),
                        decl.pos,
                    );
                }
            }
        }
    }

    fn visit_assign(&mut self, assign: &mut Assign) {
        let sym = self.scopes.lookup(&assign.name);
        if sym.is_none() {
            self.error(
                format!("Use of undeclared variable '{}'", assign.name),
                assign.pos,
            );
        }

        self.visit_expr(&mut assign.value);

        if let Some(sym) = sym {
            if sym.typ != assign.value.typ() {
                self.error(
                    format!(
                        "Type mismatch in assignment to '{}' (expected {}, got {})",
                        assign.name,
                        sym.typ,
                        assign.value.typ()
                    ),
                    assign.pos,
                );
            }
        }
    }

    // SECTION: control flow

    fn visit_if(&mut self, stmt: &mut IfStmt) {
        self.visit_expr(&mut stmt.condition);
        if stmt.condition.typ() != Type::Bool {
            self.error("Condition of if-statement must be bool", stmt.condition.pos);
        }

        self.visit_block(&mut stmt.then_body);
        if let Some(else_body) = &mut stmt.else_body {
            self.visit_block(else_body);
        }
    }

    fn visit_while(&mut self, stmt: &mut WhileStmt) {
        self.visit_expr(&mut stmt.condition);
        if stmt.condition.typ() != Type::Bool {
            self.error(
                "Condition of while-statement must be bool",
                stmt.condition.pos,
            );
        }

        self.visit_block(&mut stmt.body);
    }

    fn visit_return(&mut self, stmt: &mut ReturnStmt) {
        let Some(expected) = self.current_function_return_type else {
            self.error("Return statement outside of function", stmt.pos);
            return;
        };

        self.visit_expr(&mut stmt.value);

        if stmt.value.typ() != expected {
            self.error(
                format!(
                    "Return type mismatch (expected {}, got {})",
                    expected,
                    stmt.value.typ()
                ),
                stmt.pos,
            );
        }
    }

    fn visit_print(&mut self, stmt: &mut PrintStmt) {
        self.visit_expr(&mut stmt.value);
    }

    // SECTION: expressions

    fn visit_expr(&mut self, expr: &mut Expr) {
        let pos = expr.pos;
        let inferred = match &mut expr.kind {
            ExprKind::Literal(lit) => match lit {
                Literal::Int(_) => Type::Int,
                Literal::Bool(_) => Type::Bool,
            },
            ExprKind::Var(name) => match self.scopes.lookup(name) {
                Some(sym) => sym.typ,
                None => {
                    self.error(format!("Use of undeclared variable '{name}'"), pos);
                    Type::Int
                }
            },
            ExprKind::Call(name, args) => {
                let called = self.scopes.lookup(name);
                let typ = match called {
                    None => {
                        self.error(format!("Call to undefined function '{name}'"), pos);
                        Type::Int
                    }
                    Some(sym) if sym.kind != SymbolKind::Func => {
                        self.error(format!("'{name}' is not a function"), pos);
                        Type::Int
                    }
                    Some(sym) => sym.typ,
                };
                for arg in args.iter_mut() {
                    self.visit_expr(arg);
                }
                typ
            }
            ExprKind::Binary(left, op, right) => {
                self.visit_expr(left);
                self.visit_expr(right);
                self.binary_result_type(*op, left.typ(), right.typ(), pos)
            }
            ExprKind::Unary(op, operand) => {
                self.visit_expr(operand);
                self.unary_result_type(*op, operand.typ(), pos)
            }
        };

        expr.inferred_type = Some(inferred);
    }

    fn binary_result_type(&mut self, op: BinOp, lt: Type, rt: Type, pos: Pos) -> Type {
        if op.is_arithmetic() {
            if lt == Type::Int && rt == Type::Int {
                Type::Int
            } else {
                self.error(
                    format!("Arithmetic operator '{op}' requires int operands"),
                    pos,
                );
                Type::Int
            }
        } else if op.is_relational() {
            if lt == Type::Int && rt == Type::Int {
                Type::Bool
            } else {
                self.error(
                    format!("Relational operator '{op}' requires int operands"),
                    pos,
                );
                Type::Bool
            }
        } else if op.is_equality() {
            if lt == rt {
                Type::Bool
            } else {
                self.error(
                    format!("Equality operator '{op}' requires operands of same type"),
                    pos,
                );
                Type::Bool
            }
        } else {
            debug_assert!(op.is_logical());
            if lt == Type::Bool && rt == Type::Bool {
                Type::Bool
            } else {
                self.error(
                    format!("Logical operator '{op}' requires bool operands"),
                    pos,
                );
                Type::Bool
            }
        }
    }

    fn unary_result_type(&mut self, op: UnOp, operand: Type, pos: Pos) -> Type {
        match (op, operand) {
            (UnOp::Neg, Type::Int) => Type::Int,
            (UnOp::Not, Type::Bool) => Type::Bool,
            _ => {
                self.error(format!("Invalid operand type for '{op}'"), pos);
                Type::Int
            }
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(src: &str) -> Vec<SemanticError> {
        let mut program = parse(src).expect("fixture must parse");
        SemanticAnalyzer::new().analyze(&mut program)
    }

    #[test]
    fn accepts_well_typed_program() {
        let errs = check("int main() { int x = 1 + 2; return x; }");
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn rejects_undeclared_variable() {
        let errs = check("int main() { return x; }");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("undeclared variable"));
    }

    #[test]
    fn rejects_redeclaration_in_same_scope() {
        let errs = check("int main() { int x = 0; int x = 1; return x; }");
        assert!(errs.iter().any(|e| e.message.contains("Redeclaration")));
    }

    #[test]
    fn allows_shadowing_in_nested_scope() {
        let errs = check("int main() { int x = 0; { int x = 1; } return x; }");
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn rejects_type_mismatch_in_condition() {
        let errs = check("int main() { if (1) { } return 0; }");
        assert!(errs.iter().any(|e| e.message.contains("must be bool")));
    }

    #[test]
    fn rejects_return_type_mismatch() {
        let errs = check("bool f() { return 0; }");
        assert!(errs.iter().any(|e| e.message.contains("Return type mismatch")));
    }

    #[test]
    fn infers_call_expression_type() {
        let mut program = parse("int f() { return 1; } int main() { int x = f(); return x; }")
            .expect("fixture must parse");
        let errs = SemanticAnalyzer::new().analyze(&mut program);
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn still_type_checks_statements_after_a_return() {
        // unreachability itself is the CFG analysis's job; this pass should
        // still walk the trailing statement so `y`'s assignment is type-checked.
        let errs = check("int main() { return 0; bool y = 1; }");
        assert!(errs.iter().any(|e| e.message.contains("Type mismatch")));
    }
}
